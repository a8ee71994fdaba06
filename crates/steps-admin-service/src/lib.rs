//! 积分管理后台服务（B端）
//!
//! 提供用户、系数表、家庭、订单、促销码、统计报表等 REST API。
//!
//! ## 核心功能
//!
//! - **用户管理**：查询用户、冻结/解冻、账本流水和个人统计
//! - **系数配置**：散步形式基础系数与温度区间系数的维护
//! - **家庭管理**：家庭档案 CRUD 与成员视图
//! - **商品目录**：分类与商品管理，支持积分定价和库存
//! - **订单管理**：订单查询与状态流转（完成/取消退款）
//! - **促销码**：促销组维护与批量生成促销码
//! - **统计报表**：用户、积分、散步、订单和邀请来源的概览
//! - **数据导出**：按当前筛选条件导出用户 CSV
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)
//! - 导出：csv

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// 重新导出核心类型
pub use dto::{
    ApiResponse, BaseCoefficientDto, CreateFamilyRequest, CreateProductRequest,
    CreatePromoGroupRequest, CreateTemperatureBandRequest, GeneratePromoCodesRequest,
    OrderQueryFilter, PageResponse, PaginationParams, ReferralQueryFilter,
    ReplaceBaseCoefficientsRequest, StatsOverview, UserAdminDto, UserQueryFilter, UserStatsDto,
    WalkBucket,
};
pub use error::{AdminError, Result};
pub use state::AppState;
