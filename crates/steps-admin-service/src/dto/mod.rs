//! 管理后台 DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

// 重新导出常用类型
pub use request::{
    BaseCoefficientItem, CreateCategoryRequest, CreateFamilyRequest, CreateProductRequest,
    CreatePromoGroupRequest, CreateTemperatureBandRequest, GeneratePromoCodesRequest,
    OrderQueryFilter, PaginationParams, ReferralQueryFilter, ReplaceBaseCoefficientsRequest,
    UpdateCategoryRequest, UpdateFamilyRequest, UpdateOrderStatusRequest, UpdateProductRequest,
    UpdatePromoCodeStatusRequest, UpdatePromoGroupRequest, UpdateSettingRequest,
    UpdateTemperatureBandRequest, UpdateUserStatusRequest, UserQueryFilter, WalkBucket,
};

pub use response::{
    ApiResponse, BaseCoefficientDto, CreatedResponse, FamilyAdminDto, GeneratedCodesDto,
    OrderAdminDto, OrdersByStatusDto, PageResponse, ReferralAdminDto, ReferralInfoDto,
    SourceCountDto, StatsOverview, UserAdminDto, UserStatsDto, WalksByFormDto,
};
