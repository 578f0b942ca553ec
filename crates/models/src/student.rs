use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Lowest accepted CGPA, inclusive.
pub const GPA_MIN: f64 = 2.00;
/// Highest accepted CGPA, inclusive.
pub const GPA_MAX: f64 = 4.00;

/// Numeric student id. Always positive.
pub type StudentId = u64;

/// A stored student profile.
///
/// Field names on the wire match the persisted document:
/// `Name`, `ID`, `CGPA`, `CareerInterest`, `ImagePath`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ID")]
    pub id: StudentId,
    #[serde(rename = "CGPA")]
    pub gpa: f64,
    #[serde(rename = "CareerInterest")]
    pub career_interest: String,
    #[serde(rename = "ImagePath")]
    pub photo_path: String,
}

/// Raw, unvalidated form input for a new student.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub cgpa: String,
    pub career_interest: String,
}

/// Validated fields of a new student; the id and photo path are assigned by the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub gpa: f64,
    pub career_interest: String,
}

impl StudentInput {
    pub fn new(name: impl Into<String>, cgpa: impl Into<String>, career_interest: impl Into<String>) -> Self {
        Self { name: name.into(), cgpa: cgpa.into(), career_interest: career_interest.into() }
    }

    /// CGPA is checked first so a form with several problems reports the grade.
    /// Text fields are kept exactly as entered.
    pub fn validate(&self) -> Result<NewStudent, ModelError> {
        let gpa = parse_gpa(&self.cgpa)?;
        validate_name(&self.name)?;
        Ok(NewStudent {
            name: self.name.clone(),
            gpa,
            career_interest: self.career_interest.clone(),
        })
    }
}

impl NewStudent {
    pub fn into_record(self, id: StudentId, photo_path: String) -> StudentRecord {
        StudentRecord {
            name: self.name,
            id,
            gpa: self.gpa,
            career_interest: self.career_interest,
            photo_path,
        }
    }
}

/// Parse a CGPA and require it to lie in `[GPA_MIN, GPA_MAX]`.
pub fn parse_gpa(raw: &str) -> Result<f64, ModelError> {
    let invalid = || ModelError::Validation("Invalid CGPA. CGPA must be between 2.00 and 4.00.".into());
    let gpa: f64 = raw.trim().parse().map_err(|_| invalid())?;
    // NaN fails both comparisons, so check containment rather than exclusion.
    if !(GPA_MIN..=GPA_MAX).contains(&gpa) {
        return Err(invalid());
    }
    Ok(gpa)
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

/// Parse a student id from form input. Zero and negatives are rejected.
pub fn parse_student_id(raw: &str) -> Result<StudentId, ModelError> {
    match raw.trim().parse::<StudentId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ModelError::Validation("Invalid Student ID".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpa_bounds_are_inclusive() {
        assert_eq!(parse_gpa("2.00"), Ok(2.0));
        assert_eq!(parse_gpa("4"), Ok(4.0));
        assert_eq!(parse_gpa(" 3.5 "), Ok(3.5));
    }

    #[test]
    fn gpa_rejects_out_of_range_and_garbage() {
        for raw in ["1.99", "4.01", "-3", "abc", "", "NaN", "inf"] {
            assert!(parse_gpa(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn input_validation_checks_grade_before_name() {
        let err = StudentInput::new("", "9", "AI").validate().unwrap_err();
        assert!(err.to_string().contains("CGPA"));

        let err = StudentInput::new("   ", "3.0", "AI").validate().unwrap_err();
        assert_eq!(err, ModelError::Validation("name required".into()));
    }

    #[test]
    fn valid_input_becomes_record() {
        let new = StudentInput::new("Alice", "3.5", "AI").validate().unwrap();
        let rec = new.into_record(1, "uploads/1.jpg".into());
        assert_eq!(rec.id, 1);
        assert_eq!(rec.name, "Alice");
        assert_eq!(rec.gpa, 3.5);
        assert_eq!(rec.career_interest, "AI");
    }

    #[test]
    fn validation_keeps_text_as_entered() {
        let new = StudentInput::new("  Alice ", " 3.5", " AI ").validate().unwrap();
        assert_eq!(new.name, "  Alice ");
        assert_eq!(new.gpa, 3.5);
        assert_eq!(new.career_interest, " AI ");
    }

    #[test]
    fn student_id_must_be_positive_integer() {
        assert_eq!(parse_student_id("7"), Ok(7));
        assert!(parse_student_id("0").is_err());
        assert!(parse_student_id("-1").is_err());
        assert!(parse_student_id("x").is_err());
    }

    #[test]
    fn record_uses_persisted_field_names() {
        let rec = StudentRecord {
            name: "Bob".into(),
            id: 2,
            gpa: 3.25,
            career_interest: "Systems".into(),
            photo_path: "uploads/2.jpg".into(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["Name"], "Bob");
        assert_eq!(v["ID"], 2);
        assert_eq!(v["CGPA"], 3.25);
        assert_eq!(v["CareerInterest"], "Systems");
        assert_eq!(v["ImagePath"], "uploads/2.jpg");
    }
}
