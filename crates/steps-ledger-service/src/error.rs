//! 积分账本服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use walk_reward_engine::RewardError;

/// 积分账本服务错误类型
#[derive(Debug, Error)]
pub enum LedgerError {
    // === 用户相关错误 ===
    #[error("用户不存在: telegram_id={0}")]
    UserNotFound(i64),

    #[error("用户已被停用: telegram_id={0}")]
    UserInactive(i64),

    #[error("家庭不存在: {0}")]
    FamilyNotFound(i64),

    // === 邀请归因相关错误 ===
    #[error("不能使用自己的邀请链接: telegram_id={0}")]
    SelfReferral(i64),

    #[error("用户已有邀请归因记录: user_id={0}")]
    ReferralAlreadyAttributed(i64),

    #[error("邀请人不存在: telegram_id={0}")]
    InviterNotFound(i64),

    // === 促销码相关错误 ===
    #[error("促销码不存在: {0}")]
    PromoCodeNotFound(String),

    #[error("促销码已失效或已用完: {0}")]
    PromoCodeExhausted(String),

    // === 商品与订单相关错误 ===
    #[error("商品不存在: {0}")]
    ProductNotFound(i64),

    #[error("商品已下架: {0}")]
    ProductInactive(i64),

    #[error("商品库存不足: product_id={0}")]
    ProductOutOfStock(i64),

    #[error("积分余额不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("订单不存在: {0}")]
    OrderNotFound(i64),

    #[error("订单状态不允许此操作: order_id={order_id}, current_status={current_status}")]
    InvalidOrderStatus {
        order_id: i64,
        current_status: String,
    },

    // === 设置相关错误 ===
    #[error("设置项不存在: {0}")]
    SettingNotFound(String),

    #[error("设置项格式无效: key={key}, value={value}")]
    MisconfiguredSetting { key: String, value: String },

    // === 系统错误 ===
    #[error("奖励计算失败: {0}")]
    Reward(#[from] RewardError),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error("参数校验失败: {0}")]
    Validation(String),
}

/// 积分账本服务 Result 类型别名
pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 检查是否为业务错误（非系统错误）
    ///
    /// 系数缺口类错误（缺少系数、温度超出区间、设置项格式无效）
    /// 属于配置故障而非用户输入问题，归为系统错误
    pub fn is_business_error(&self) -> bool {
        match self {
            Self::Database(_)
            | Self::Serialization(_)
            | Self::Internal(_)
            | Self::MisconfiguredSetting { .. } => false,
            Self::Reward(e) => !e.is_configuration_gap(),
            _ => true,
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_)
            | Self::FamilyNotFound(_)
            | Self::InviterNotFound(_)
            | Self::PromoCodeNotFound(_)
            | Self::ProductNotFound(_)
            | Self::OrderNotFound(_)
            | Self::SettingNotFound(_) => StatusCode::NOT_FOUND,

            Self::UserInactive(_) => StatusCode::FORBIDDEN,

            Self::SelfReferral(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 请求合法但与当前状态冲突
            Self::ReferralAlreadyAttributed(_)
            | Self::PromoCodeExhausted(_)
            | Self::ProductInactive(_)
            | Self::ProductOutOfStock(_)
            | Self::InsufficientBalance { .. }
            | Self::InvalidOrderStatus { .. } => StatusCode::CONFLICT,

            // 系数缺口是配置故障，输入类错误归为 400
            Self::Reward(e) => {
                if e.is_configuration_gap() {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::BAD_REQUEST
                }
            }

            Self::Database(_)
            | Self::Serialization(_)
            | Self::Internal(_)
            | Self::MisconfiguredSetting { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::UserInactive(_) => "USER_INACTIVE",
            Self::FamilyNotFound(_) => "FAMILY_NOT_FOUND",
            Self::SelfReferral(_) => "SELF_REFERRAL",
            Self::ReferralAlreadyAttributed(_) => "REFERRAL_ALREADY_ATTRIBUTED",
            Self::InviterNotFound(_) => "INVITER_NOT_FOUND",
            Self::PromoCodeNotFound(_) => "PROMO_CODE_NOT_FOUND",
            Self::PromoCodeExhausted(_) => "PROMO_CODE_EXHAUSTED",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::ProductInactive(_) => "PRODUCT_INACTIVE",
            Self::ProductOutOfStock(_) => "PRODUCT_OUT_OF_STOCK",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::InvalidOrderStatus { .. } => "INVALID_ORDER_STATUS",
            Self::SettingNotFound(_) => "SETTING_NOT_FOUND",
            Self::MisconfiguredSetting { .. } => "MISCONFIGURED_SETTING",
            Self::Reward(e) => match e {
                RewardError::InvalidSteps(_) => "INVALID_STEPS",
                RewardError::MissingFormCoefficient(_) => "MISSING_FORM_COEFFICIENT",
                RewardError::TemperatureOutOfRange { .. } => "TEMPERATURE_OUT_OF_RANGE",
                _ => "COEFFICIENT_CONFIG_ERROR",
            },
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露；
        // 通用提示为面向终端用户的俄文文案，前端按 code 自行本地化业务错误
        let message = if self.is_business_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, code = self.error_code(), "请求处理失败");
            "Сервис временно недоступен, попробуйте позже".to_string()
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
impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walk_reward_engine::WalkForm;

    #[test]
    fn test_error_is_retryable() {
        assert!(LedgerError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!LedgerError::UserNotFound(1).is_retryable());
        assert!(
            !LedgerError::InsufficientBalance {
                required: 500,
                available: 120
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(LedgerError::UserNotFound(1).is_business_error());
        assert!(LedgerError::PromoCodeExhausted("SPRING24".to_string()).is_business_error());
        assert!(LedgerError::SelfReferral(42).is_business_error());
        assert!(!LedgerError::Internal("panic".to_string()).is_business_error());
        assert!(
            !LedgerError::MisconfiguredSetting {
                key: "referral_reward_percent".to_string(),
                value: "abc".to_string()
            }
            .is_business_error()
        );
    }

    #[test]
    fn test_reward_error_classification() {
        // 负数步数是调用方输入问题，属于业务错误
        let err = LedgerError::Reward(RewardError::InvalidSteps(-1));
        assert!(err.is_business_error());
        assert_eq!(err.error_code(), "INVALID_STEPS");

        // 缺少系数是配置缺口，属于系统错误
        let err = LedgerError::Reward(RewardError::MissingFormCoefficient(WalkForm::Dog));
        assert!(!err.is_business_error());
        assert_eq!(err.error_code(), "MISSING_FORM_COEFFICIENT");

        let err = LedgerError::Reward(RewardError::TemperatureOutOfRange {
            walk_form: WalkForm::Stroller,
            temperature_c: -45.0,
        });
        assert!(!err.is_business_error());
        assert_eq!(err.error_code(), "TEMPERATURE_OUT_OF_RANGE");
    }

    #[test]
    fn test_error_code() {
        assert_eq!(LedgerError::UserNotFound(1).error_code(), "USER_NOT_FOUND");
        assert_eq!(
            LedgerError::InsufficientBalance {
                required: 500,
                available: 120
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            LedgerError::PromoCodeExhausted("X".to_string()).error_code(),
            "PROMO_CODE_EXHAUSTED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientBalance {
            required: 500,
            available: 120,
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("120"));

        let err = LedgerError::InvalidOrderStatus {
            order_id: 7,
            current_status: "COMPLETED".to_string(),
        };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("COMPLETED"));
    }

    #[test]
    fn test_error_status_codes() {
        use axum::http::StatusCode;

        assert_eq!(
            LedgerError::UserNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LedgerError::UserInactive(1).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            LedgerError::SelfReferral(42).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::PromoCodeExhausted("X".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LedgerError::InsufficientBalance {
                required: 500,
                available: 120
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        // 输入类奖励错误归为 400，系数缺口归为 500
        assert_eq!(
            LedgerError::Reward(RewardError::InvalidSteps(-1)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LedgerError::Reward(RewardError::MissingFormCoefficient(WalkForm::Dog)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            LedgerError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// 错误响应体必须包含 success/code/message/data 四个字段
    #[tokio::test]
    async fn test_into_response_body_structure() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let response = LedgerError::UserNotFound(42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["code"], serde_json::json!("USER_NOT_FOUND"));
        assert!(body["message"].as_str().unwrap_or("").contains("42"));
        assert!(body["data"].is_null());
    }

    /// 系统级错误的响应消息不应泄露内部细节
    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        use axum::response::IntoResponse;

        let err = LedgerError::Internal("connection pool exhausted at 10.0.0.1".to_string());
        let response = err.into_response();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

        let message = body["message"].as_str().unwrap_or("");
        assert!(!message.contains("10.0.0.1"));
        assert_eq!(message, "Сервис временно недоступен, попробуйте позже");
    }
}
