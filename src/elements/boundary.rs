//! Nodal boundary conditions

use serde::{Deserialize, Serialize};

use crate::error::{AeroelasticError, AeroelasticResult};

/// Boundary condition of a structural node
///
/// Encoded on input and in the kernel export as `0`, `-1` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum BoundaryCondition {
    /// Code `0`: both a position DOF and a force DOF
    #[default]
    Internal,
    /// Code `-1`: position DOF only, no reaction force (free end)
    FreeEnd,
    /// Code `1`: force DOF only, position prescribed (clamped)
    Clamped,
}

impl BoundaryCondition {
    /// Parse the integer code
    pub fn from_code(code: i32) -> AeroelasticResult<Self> {
        match code {
            0 => Ok(Self::Internal),
            -1 => Ok(Self::FreeEnd),
            1 => Ok(Self::Clamped),
            other => Err(AeroelasticError::InvalidInput(format!(
                "boundary condition code must be 0, -1 or 1, got {other}"
            ))),
        }
    }

    /// Integer code
    pub fn code(self) -> i32 {
        match self {
            Self::Internal => 0,
            Self::FreeEnd => -1,
            Self::Clamped => 1,
        }
    }

    /// True if the node owns position (displacement) unknowns
    pub fn has_position_dof(self) -> bool {
        matches!(self, Self::Internal | Self::FreeEnd)
    }

    /// True if the node owns force (reaction) unknowns
    pub fn has_force_dof(self) -> bool {
        matches!(self, Self::Internal | Self::Clamped)
    }
}

impl TryFrom<i32> for BoundaryCondition {
    type Error = AeroelasticError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<BoundaryCondition> for i32 {
    fn from(bc: BoundaryCondition) -> Self {
        bc.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for code in [-1, 0, 1] {
            assert_eq!(BoundaryCondition::from_code(code).unwrap().code(), code);
        }
        assert!(BoundaryCondition::from_code(2).is_err());
    }

    #[test]
    fn test_dof_ownership() {
        assert!(BoundaryCondition::Internal.has_position_dof());
        assert!(BoundaryCondition::Internal.has_force_dof());
        assert!(BoundaryCondition::FreeEnd.has_position_dof());
        assert!(!BoundaryCondition::FreeEnd.has_force_dof());
        assert!(!BoundaryCondition::Clamped.has_position_dof());
        assert!(BoundaryCondition::Clamped.has_force_dof());
    }

    #[test]
    fn test_deserialize_from_code() {
        let bcs: Vec<BoundaryCondition> = serde_json::from_str("[1, 0, -1]").unwrap();
        assert_eq!(
            bcs,
            vec![
                BoundaryCondition::Clamped,
                BoundaryCondition::Internal,
                BoundaryCondition::FreeEnd
            ]
        );
    }
}
