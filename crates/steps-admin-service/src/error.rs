//! 管理后台错误类型定义
//!
//! 包含所有 admin service 特有的错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("用户不存在: {0}")]
    UserNotFound(i64),
    #[error("家庭不存在: {0}")]
    FamilyNotFound(i64),
    #[error("分类不存在: {0}")]
    CategoryNotFound(i64),
    #[error("商品不存在: {0}")]
    ProductNotFound(i64),
    #[error("订单不存在: {0}")]
    OrderNotFound(i64),
    #[error("促销组不存在: {0}")]
    PromoGroupNotFound(i64),
    #[error("促销码不存在: {0}")]
    PromoCodeNotFound(i64),
    #[error("温度区间不存在: {0}")]
    TemperatureBandNotFound(i64),
    #[error("设置项不存在: {0}")]
    SettingNotFound(String),

    // 业务错误
    #[error("订单状态不允许此操作: order_id={order_id}, current_status={current_status}")]
    InvalidOrderStatus {
        order_id: i64,
        current_status: String,
    },
    #[error("系数表校验失败: {0}")]
    InvalidCoefficientTable(String),
    #[error("促销码生成失败: 请求 {requested} 个，实际生成 {generated} 个")]
    PromoGenerationExhausted { requested: i64, generated: i64 },

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("CSV 导出错误: {0}")]
    Csv(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidCoefficientTable(_) => StatusCode::BAD_REQUEST,

            Self::UserNotFound(_)
            | Self::FamilyNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::ProductNotFound(_)
            | Self::OrderNotFound(_)
            | Self::PromoGroupNotFound(_)
            | Self::PromoCodeNotFound(_)
            | Self::TemperatureBandNotFound(_)
            | Self::SettingNotFound(_) => StatusCode::NOT_FOUND,

            // 409 表示请求合法但与当前状态冲突
            Self::InvalidOrderStatus { .. } | Self::PromoGenerationExhausted { .. } => {
                StatusCode::CONFLICT
            }

            Self::Database(_) | Self::Csv(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::FamilyNotFound(_) => "FAMILY_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::PromoGroupNotFound(_) => "PROMO_GROUP_NOT_FOUND",
            Self::PromoCodeNotFound(_) => "PROMO_CODE_NOT_FOUND",
            Self::TemperatureBandNotFound(_) => "TEMPERATURE_BAND_NOT_FOUND",
            Self::SettingNotFound(_) => "SETTING_NOT_FOUND",
            Self::InvalidOrderStatus { .. } => "INVALID_ORDER_STATUS",
            Self::InvalidCoefficientTable(_) => "INVALID_COEFFICIENT_TABLE",
            Self::PromoGenerationExhausted { .. } => "PROMO_GENERATION_EXHAUSTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "Сервис временно недоступен, попробуйте позже".to_string()
            }
            Self::Csv(e) => {
                tracing::error!(error = %e, "CSV 导出失败");
                "Сервис временно недоступен, попробуйте позже".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "Сервис временно недоступен, попробуйте позже".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 CSV 写入错误转换
impl From<csv::Error> for AdminError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// 从奖励引擎错误转换
///
/// 管理端写入系数时触发的表校验错误属于操作员输入问题，归为 400
impl From<walk_reward_engine::RewardError> for AdminError {
    fn from(err: walk_reward_engine::RewardError) -> Self {
        Self::InvalidCoefficientTable(err.to_string())
    }
}

/// 从账本服务错误转换
///
/// 管理端复用账本服务的订单流转和聚合查询，
/// 映射决定了操作员能否区分「资源不存在」和「系统故障」
impl From<steps_ledger::LedgerError> for AdminError {
    fn from(err: steps_ledger::LedgerError) -> Self {
        use steps_ledger::LedgerError;
        match err {
            LedgerError::Database(e) => Self::Database(e),
            LedgerError::UserNotFound(id) => Self::UserNotFound(id),
            LedgerError::FamilyNotFound(id) => Self::FamilyNotFound(id),
            LedgerError::ProductNotFound(id) => Self::ProductNotFound(id),
            LedgerError::OrderNotFound(id) => Self::OrderNotFound(id),
            LedgerError::InvalidOrderStatus {
                order_id,
                current_status,
            } => Self::InvalidOrderStatus {
                order_id,
                current_status,
            },
            LedgerError::Validation(msg) => Self::Validation(msg),
            // 管理端改动系数表后的整表校验失败属于操作员输入问题
            LedgerError::Reward(e) => Self::InvalidCoefficientTable(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
