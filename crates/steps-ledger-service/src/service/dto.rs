//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Order, OrderItem, Product, User, WalkForm};

/// 注册请求
///
/// /start 时提交，token 为邀请令牌或落地来源标签
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub telegram_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl StartRequest {
    pub fn new(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            username: None,
            token: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// 用户概要 DTO
///
/// 注册和资料查询的基础视图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub id: i64,
    pub telegram_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub balance: i64,
    pub step_count: i64,
    pub total_walks: i32,
    pub is_active: bool,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        let total_walks = user.total_walk_count();
        Self {
            id: user.id,
            telegram_id: user.telegram_id,
            username: user.username,
            phone: user.phone,
            email: user.email,
            balance: user.balance,
            step_count: user.step_count,
            total_walks,
            is_active: user.is_active,
        }
    }
}

/// 注册结果
///
/// created 标记本次 /start 是否新建了用户
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub user: UserProfileDto,
    pub created: bool,
}

/// 联系方式更新请求
///
/// 仅覆盖传入的字段
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 5, max = 32, message = "电话号码长度必须在5-32之间"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
}

/// 散步奖励请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditWalkRequest {
    pub telegram_id: i64,
    pub walk_form: WalkForm,
    pub temperature_c: f64,
    pub steps: i64,
}

impl CreditWalkRequest {
    pub fn new(telegram_id: i64, walk_form: WalkForm, temperature_c: f64, steps: i64) -> Self {
        Self {
            telegram_id,
            walk_form,
            temperature_c,
            steps,
        }
    }
}

/// 散步奖励结果
///
/// 包含计算明细和入账后的新余额
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkRewardDto {
    pub entry_id: i64,
    pub walk_form: WalkForm,
    pub base_coefficient: f64,
    pub temperature_coefficient: f64,
    pub steps: i64,
    pub points: i64,
    pub new_balance: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_share: Option<ReferralShareDto>,
}

/// 邀请人分成
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralShareDto {
    pub inviter_id: i64,
    pub points: i64,
}

/// 促销码兑换结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoRedemptionDto {
    pub code: String,
    pub discount_percent: i32,
    pub remaining_uses: i32,
}

/// 订单行
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDto {
    pub product_id: i64,
    #[validate(range(min = 1, message = "商品数量必须大于0"))]
    pub quantity: i32,
}

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub telegram_id: i64,
    #[validate(length(min = 1, message = "订单不能为空"))]
    #[validate(nested)]
    pub items: Vec<OrderLineDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvz_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl PlaceOrderRequest {
    pub fn new(telegram_id: i64, items: Vec<OrderLineDto>) -> Self {
        Self {
            telegram_id,
            items,
            pvz_id: None,
            comment: None,
            promo_code: None,
        }
    }

    pub fn with_pvz(mut self, pvz_id: i64) -> Self {
        self.pvz_id = Some(pvz_id);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }
}

/// 下单结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderDto {
    pub order_id: i64,
    pub total_points: i64,
    pub discount_percent: i32,
    pub new_balance: i64,
}

/// 订单详情
///
/// 订单及其全部明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailDto {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// 个人资料 DTO
///
/// 机器人"我的资料"视图，聚合家庭名称和客服联系方式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub telegram_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub balance: i64,
    pub step_count: i64,
    pub total_walks: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_contact: Option<String>,
}

/// 商品目录分区 DTO
///
/// 一个启用分类及其下启用商品
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSectionDto {
    pub category_id: i64,
    pub category_name: String,
    pub products: Vec<Product>,
}

/// 商品目录 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDto {
    pub sections: Vec<CatalogSectionDto>,
}

/// API 统一响应
///
/// Bot 端与管理端共用的响应信封
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// 创建错误响应
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }
}

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// 创建分页响应
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    /// 创建空分页响应
    pub fn empty(page: i64, page_size: i64) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_start_request_builder() {
        let request = StartRequest::new(123456)
            .with_username("walker")
            .with_token("ref_42_sticker");

        assert_eq!(request.telegram_id, 123456);
        assert_eq!(request.username, Some("walker".to_string()));
        assert_eq!(request.token, Some("ref_42_sticker".to_string()));
    }

    #[test]
    fn test_walk_reward_dto_serialization() {
        let dto = WalkRewardDto {
            entry_id: 10,
            walk_form: WalkForm::Dog,
            base_coefficient: 1.2,
            temperature_coefficient: 1.5,
            steps: 4000,
            points: 7200,
            new_balance: 7500,
            referral_share: None,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["entryId"], 10);
        assert_eq!(json["walkForm"], "DOG");
        assert_eq!(json["newBalance"], 7500);
        // referral_share 为 None 时不应出现在 JSON 中
        assert!(!json.as_object().unwrap().contains_key("referralShare"));
    }

    #[test]
    fn test_place_order_request_validation() {
        let empty = PlaceOrderRequest::new(1, vec![]);
        assert!(empty.validate().is_err());

        let zero_qty = PlaceOrderRequest::new(
            1,
            vec![OrderLineDto {
                product_id: 5,
                quantity: 0,
            }],
        );
        assert!(zero_qty.validate().is_err());

        let valid = PlaceOrderRequest::new(
            1,
            vec![OrderLineDto {
                product_id: 5,
                quantity: 2,
            }],
        )
        .with_promo_code("SPRING25");
        assert!(valid.validate().is_ok());
        assert_eq!(valid.promo_code, Some("SPRING25".to_string()));
    }

    #[test]
    fn test_update_contact_request_validation() {
        let valid = UpdateContactRequest {
            phone: Some("+79001234567".to_string()),
            email: Some("user@example.com".to_string()),
        };
        assert!(valid.validate().is_ok());

        let bad_email = UpdateContactRequest {
            phone: None,
            email: Some("not-an-email".to_string()),
        };
        assert!(bad_email.validate().is_err());

        let empty = UpdateContactRequest {
            phone: None,
            email: None,
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_profile_dto_skips_missing_fields() {
        let profile = ProfileDto {
            telegram_id: 99,
            username: None,
            phone: None,
            email: None,
            balance: 100,
            step_count: 2000,
            total_walks: 3,
            family_name: None,
            support_contact: Some("@support".to_string()),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["telegramId"], 99);
        assert_eq!(json["supportContact"], "@support");
        assert!(!json.as_object().unwrap().contains_key("familyName"));
        assert!(!json.as_object().unwrap().contains_key("username"));
    }

    #[test]
    fn test_user_profile_dto_from_user() {
        let user = User {
            id: 1,
            telegram_id: 555,
            username: Some("walker".to_string()),
            phone: None,
            email: None,
            balance: 300,
            step_count: 12000,
            walk_count_stroller: 2,
            walk_count_dog: 3,
            walk_count_stroller_dog: 1,
            landing_source: None,
            family_id: None,
            role: crate::models::UserRole::User,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let dto = UserProfileDto::from(user);
        assert_eq!(dto.telegram_id, 555);
        assert_eq!(dto.total_walks, 6);
        assert_eq!(dto.balance, 300);
    }

    #[test]
    fn test_api_response_error_serialization() {
        let response = ApiResponse::<()>::error("USER_NOT_FOUND", "用户不存在");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "USER_NOT_FOUND");
        // data 为 None 时不应出现在响应体中
        assert!(!json.as_object().unwrap().contains_key("data"));
    }

    #[test]
    fn test_page_response_total_pages() {
        let response = PageResponse::new(vec![1, 2, 3], 100, 2, 10);
        assert_eq!(response.total_pages, 10);

        // 不整除时向上取整
        let response = PageResponse::<i32>::new(vec![], 101, 1, 10);
        assert_eq!(response.total_pages, 11);

        let response = PageResponse::<i32>::empty(1, 10);
        assert_eq!(response.total, 0);
        assert_eq!(response.total_pages, 0);
    }
}
