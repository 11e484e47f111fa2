use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role held by a user inside its company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(format!("invalid role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum EmploymentType {
    #[serde(rename = "Full-Time")]
    #[sqlx(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    #[sqlx(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Seasonal")]
    #[sqlx(rename = "Seasonal")]
    Seasonal,
    #[serde(rename = "Temporary")]
    #[sqlx(rename = "Temporary")]
    Temporary,
    #[serde(rename = "On-Call")]
    #[sqlx(rename = "On-Call")]
    OnCall,
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-Time" => Ok(Self::FullTime),
            "Part-Time" => Ok(Self::PartTime),
            "Seasonal" => Ok(Self::Seasonal),
            "Temporary" => Ok(Self::Temporary),
            "On-Call" => Ok(Self::OnCall),
            _ => Err("Invalid employment type".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ShiftType {
    #[serde(rename = "First Shift")]
    #[sqlx(rename = "First Shift")]
    First,
    #[serde(rename = "Second Shift")]
    #[sqlx(rename = "Second Shift")]
    Second,
    #[serde(rename = "Third Shift")]
    #[sqlx(rename = "Third Shift")]
    Third,
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "First Shift" => Ok(Self::First),
            "Second Shift" => Ok(Self::Second),
            "Third Shift" => Ok(Self::Third),
            _ => Err("Invalid shift type".into()),
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub full_name: String,
    pub role: Role,
    pub employment_type: Option<EmploymentType>,
    pub shift_type: Option<ShiftType>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_enums_parse_their_display_names() {
        assert_eq!("On-Call".parse::<EmploymentType>(), Ok(EmploymentType::OnCall));
        assert_eq!("Third Shift".parse::<ShiftType>(), Ok(ShiftType::Third));
        assert!("Full Time".parse::<EmploymentType>().is_err());
        assert!("first shift".parse::<ShiftType>().is_err());
    }

    #[test]
    fn schedule_enums_serialize_with_display_names() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::FullTime).unwrap(),
            "\"Full-Time\""
        );
        assert_eq!(
            serde_json::to_string(&ShiftType::Second).unwrap(),
            "\"Second Shift\""
        );
    }

    #[test]
    fn role_roundtrips_through_str() {
        for role in [Role::Admin, Role::Manager, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
