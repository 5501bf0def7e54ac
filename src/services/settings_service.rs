use crate::entities::app_settings_entity::{self as settings, SETTINGS_ROW_ID};
use crate::error::{AppError, AppResult};
use crate::models::GradeSettings;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

#[derive(Clone)]
pub struct SettingsService {
    pool: DatabaseConnection,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn grades(&self) -> AppResult<GradeSettings> {
        load_grades(&self.pool).await
    }

    pub async fn update_grades(&self, grades: GradeSettings) -> AppResult<GradeSettings> {
        validate_grades(&grades)?;

        let row = settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?;
        let active = settings::ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            grade_debutant_label: Set(grades.debutant_label.trim().to_string()),
            grade_bronze_label: Set(grades.bronze_label.trim().to_string()),
            grade_argent_label: Set(grades.argent_label.trim().to_string()),
            grade_or_label: Set(grades.or_label.trim().to_string()),
            grade_debutant_max: Set(grades.debutant_max),
            grade_bronze_max: Set(grades.bronze_max),
            grade_argent_max: Set(grades.argent_max),
            updated_at: Set(Some(Utc::now())),
        };
        // 种子行被删除时重新插入
        let saved = match row {
            Some(_) => active.update(&self.pool).await?,
            None => active.insert(&self.pool).await?,
        };

        log::info!("Grade settings updated");
        Ok(to_grades(saved))
    }
}

pub(crate) async fn load_grades<C: ConnectionTrait>(db: &C) -> AppResult<GradeSettings> {
    Ok(settings::Entity::find_by_id(SETTINGS_ROW_ID)
        .one(db)
        .await?
        .map(to_grades)
        .unwrap_or_else(default_grades))
}

fn to_grades(m: settings::Model) -> GradeSettings {
    GradeSettings {
        debutant_label: m.grade_debutant_label,
        bronze_label: m.grade_bronze_label,
        argent_label: m.grade_argent_label,
        or_label: m.grade_or_label,
        debutant_max: m.grade_debutant_max,
        bronze_max: m.grade_bronze_max,
        argent_max: m.grade_argent_max,
    }
}

pub fn default_grades() -> GradeSettings {
    GradeSettings {
        debutant_label: "Débutant".to_string(),
        bronze_label: "Bronze".to_string(),
        argent_label: "Argent".to_string(),
        or_label: "Or".to_string(),
        debutant_max: 100,
        bronze_max: 500,
        argent_max: 1500,
    }
}

fn validate_grades(g: &GradeSettings) -> AppResult<()> {
    let labels = [&g.debutant_label, &g.bronze_label, &g.argent_label, &g.or_label];
    if labels.iter().any(|l| l.trim().is_empty()) {
        return Err(AppError::ValidationError(
            "Grade labels cannot be empty".to_string(),
        ));
    }
    if g.debutant_max < 0 || g.debutant_max >= g.bronze_max || g.bronze_max >= g.argent_max {
        return Err(AppError::ValidationError(
            "Grade thresholds must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_grades() {
        assert!(validate_grades(&default_grades()).is_ok());

        let mut g = default_grades();
        g.bronze_max = 100;
        assert!(validate_grades(&g).is_err());

        let mut g = default_grades();
        g.or_label = "  ".into();
        assert!(validate_grades(&g).is_err());
    }
}
