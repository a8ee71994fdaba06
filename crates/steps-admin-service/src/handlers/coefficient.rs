//! 系数表管理 API 处理器
//!
//! 每次写入都在同一事务内重载整表校验，校验不过即回滚，
//! 提交成功后同步刷新进程内系数存储

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};
use validator::Validate;

use steps_ledger::{CoefficientRepository, TemperatureCoefficientRow};
use walk_reward_engine::{FormCoefficient, TemperatureBand};

use crate::{
    dto::{
        ApiResponse, BaseCoefficientDto, CreateTemperatureBandRequest, CreatedResponse,
        ReplaceBaseCoefficientsRequest, UpdateTemperatureBandRequest,
    },
    error::AdminError,
    state::AppState,
};

impl From<steps_ledger::WalkFormCoefficientRow> for BaseCoefficientDto {
    fn from(row: steps_ledger::WalkFormCoefficientRow) -> Self {
        Self {
            walk_form: row.walk_form,
            coefficient: row.coefficient,
            updated_at: row.updated_at,
        }
    }
}

/// 获取基础系数列表
///
/// GET /api/admin/coefficients/base
#[instrument(skip(state))]
pub async fn list_base_coefficients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BaseCoefficientDto>>>, AdminError> {
    let rows = state.coefficients.list_base().await?;
    let items: Vec<BaseCoefficientDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(items)))
}

/// 整表替换基础系数
///
/// PUT /api/admin/coefficients/base
///
/// 每种散步形式恰好一行的约束由整表校验保证，重复形式会被拒绝
pub async fn replace_base_coefficients(
    State(state): State<AppState>,
    Json(req): Json<ReplaceBaseCoefficientsRequest>,
) -> Result<Json<ApiResponse<Vec<BaseCoefficientDto>>>, AdminError> {
    req.validate()?;

    let rows: Vec<FormCoefficient> = req
        .items
        .iter()
        .map(|item| FormCoefficient {
            walk_form: item.walk_form,
            coefficient: item.coefficient,
        })
        .collect();

    let mut tx = state.pool.begin().await?;
    CoefficientRepository::replace_base_in_tx(&mut tx, &rows).await?;
    let table = CoefficientRepository::load_table_in_tx(&mut tx).await?;
    tx.commit().await?;

    state.store.replace(&table);
    info!(forms = rows.len(), "基础系数表已替换");

    let rows = state.coefficients.list_base().await?;
    let items: Vec<BaseCoefficientDto> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(items)))
}

/// 获取温度区间系数列表
///
/// GET /api/admin/coefficients/temperature
#[instrument(skip(state))]
pub async fn list_temperature_bands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TemperatureCoefficientRow>>>, AdminError> {
    let rows = state.coefficients.list_temperature().await?;
    Ok(Json(ApiResponse::success(rows)))
}

fn band_from_parts(
    walk_form: steps_ledger::WalkForm,
    min: f64,
    max: f64,
    coef: f64,
) -> TemperatureBand {
    TemperatureBand {
        walk_form,
        min_temp_c: min,
        max_temp_c: max,
        coefficient: coef,
    }
}

/// 新增温度区间
///
/// POST /api/admin/coefficients/temperature
///
/// 与已有区间重叠或区间颠倒时整表校验失败，写入回滚
pub async fn create_temperature_band(
    State(state): State<AppState>,
    Json(req): Json<CreateTemperatureBandRequest>,
) -> Result<Json<ApiResponse<CreatedResponse>>, AdminError> {
    req.validate()?;

    let band = band_from_parts(req.walk_form, req.min_temp_c, req.max_temp_c, req.coefficient);

    let mut tx = state.pool.begin().await?;
    let id = CoefficientRepository::insert_temperature_in_tx(&mut tx, &band).await?;
    let table = CoefficientRepository::load_table_in_tx(&mut tx).await?;
    tx.commit().await?;

    state.store.replace(&table);
    info!(
        band_id = id,
        walk_form = ?req.walk_form,
        min_temp_c = req.min_temp_c,
        max_temp_c = req.max_temp_c,
        "温度区间已创建"
    );

    Ok(Json(ApiResponse::success(CreatedResponse::new(id))))
}

/// 更新温度区间
///
/// PUT /api/admin/coefficients/temperature/{id}
pub async fn update_temperature_band(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTemperatureBandRequest>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    req.validate()?;

    let band = band_from_parts(req.walk_form, req.min_temp_c, req.max_temp_c, req.coefficient);

    let mut tx = state.pool.begin().await?;
    let hit = CoefficientRepository::update_temperature_in_tx(&mut tx, id, &band).await?;
    if !hit {
        return Err(AdminError::TemperatureBandNotFound(id));
    }
    let table = CoefficientRepository::load_table_in_tx(&mut tx).await?;
    tx.commit().await?;

    state.store.replace(&table);
    info!(band_id = id, "温度区间已更新");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 删除温度区间
///
/// DELETE /api/admin/coefficients/temperature/{id}
pub async fn delete_temperature_band(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let mut tx = state.pool.begin().await?;
    let hit = CoefficientRepository::delete_temperature_in_tx(&mut tx, id).await?;
    if !hit {
        return Err(AdminError::TemperatureBandNotFound(id));
    }
    let table = CoefficientRepository::load_table_in_tx(&mut tx).await?;
    tx.commit().await?;

    state.store.replace(&table);
    info!(band_id = id, "温度区间已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steps_ledger::WalkForm;

    #[test]
    fn test_band_from_parts() {
        let band = band_from_parts(WalkForm::Dog, -10.0, 0.0, 1.4);
        assert_eq!(band.walk_form, WalkForm::Dog);
        assert!(band.covers(-5.0));
        assert!(!band.covers(0.0));
    }

    #[test]
    fn test_replace_request_rejects_empty_items() {
        let req = ReplaceBaseCoefficientsRequest { items: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_band_request_rejects_non_positive_coefficient() {
        let req = CreateTemperatureBandRequest {
            walk_form: WalkForm::Stroller,
            min_temp_c: 0.0,
            max_temp_c: 10.0,
            coefficient: -1.0,
        };
        assert!(req.validate().is_err());
    }
}
