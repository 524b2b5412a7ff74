use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;

use crate::errors::AppError;

lazy_static! {
    static ref TIME_RE: Regex = Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

pub fn validate_workout_type(workout_type: &str) -> Result<(), AppError> {
    if !["strength", "cardio", "hiit", "flexibility", "custom"].contains(&workout_type) {
        return Err(AppError::BadRequest(format!(
            "Invalid workout type: {}",
            workout_type
        )));
    }
    Ok(())
}

pub fn validate_workout_status(status: &str) -> Result<(), AppError> {
    if !["scheduled", "in_progress", "completed", "cancelled", "skipped"].contains(&status) {
        return Err(AppError::BadRequest(format!("Invalid status: {}", status)));
    }
    Ok(())
}

pub fn validate_fitness_level(fitness_level: &str) -> Result<(), AppError> {
    if !["beginner", "intermediate", "advanced"].contains(&fitness_level) {
        return Err(AppError::BadRequest(
            "Fitness level must be beginner, intermediate or advanced".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_group_by(group_by: &str) -> Result<(), AppError> {
    if !["day", "week", "month", "exercise"].contains(&group_by) {
        return Err(AppError::BadRequest(format!(
            "Invalid groupBy value: {}",
            group_by
        )));
    }
    Ok(())
}

pub fn validate_report_type(report_type: &str) -> Result<(), AppError> {
    if ![
        "progress",
        "volume",
        "frequency",
        "strength",
        "body",
        "goals",
        "dashboard",
    ]
    .contains(&report_type)
    {
        return Err(AppError::BadRequest(format!(
            "Invalid report type: {}",
            report_type
        )));
    }
    Ok(())
}

// Lookahead patterns are unavailable in the regex crate, so the password
// policy is checked character-wise
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(AppError::BadRequest(
            "Password must contain at least one uppercase letter, one lowercase letter and one number"
                .to_string(),
        ));
    }
    Ok(())
}

// Scheduled time arrives as "HH:MM" on the wire
pub fn validate_scheduled_time(time: &str) -> Result<(), AppError> {
    if !TIME_RE.is_match(time) {
        return Err(AppError::BadRequest(
            "Scheduled time must be in HH:MM format".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_types() {
        assert!(validate_workout_type("hiit").is_ok());
        assert!(validate_workout_type("crossfit").is_err());
    }

    #[test]
    fn statuses() {
        for s in ["scheduled", "in_progress", "completed", "cancelled", "skipped"] {
            assert!(validate_workout_status(s).is_ok());
        }
        assert!(validate_workout_status("done").is_err());
    }

    #[test]
    fn scheduled_times() {
        assert!(validate_scheduled_time("07:30").is_ok());
        assert!(validate_scheduled_time("23:59").is_ok());
        assert!(validate_scheduled_time("24:00").is_err());
        assert!(validate_scheduled_time("7:5").is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Sup3rSecret").is_ok());
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }

    #[test]
    fn report_types() {
        assert!(validate_report_type("dashboard").is_ok());
        assert!(validate_report_type("completion").is_err());
    }
}
