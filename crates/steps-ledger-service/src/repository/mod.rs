//! 数据访问层
//!
//! 每个实体一个仓储，持有 PgPool；跨仓储的事务由服务层
//! 开启并通过 *_in_tx 关联函数传递连接

pub mod catalog_repo;
pub mod coefficient_repo;
pub mod family_repo;
pub mod ledger_repo;
pub mod order_repo;
pub mod promo_repo;
pub mod referral_repo;
pub mod settings_repo;
pub mod traits;
pub mod user_repo;

pub use catalog_repo::CatalogRepository;
pub use coefficient_repo::{
    CoefficientRepository, TemperatureCoefficientRow, WalkFormCoefficientRow,
};
pub use family_repo::FamilyRepository;
pub use ledger_repo::LedgerRepository;
pub use order_repo::OrderRepository;
pub use promo_repo::PromoRepository;
pub use referral_repo::ReferralRepository;
pub use settings_repo::SettingsRepository;
pub use traits::{
    CatalogRepositoryTrait, FamilyRepositoryTrait, LedgerRepositoryTrait, OrderRepositoryTrait,
    PromoRepositoryTrait, ReferralRepositoryTrait, SettingsRepositoryTrait, UserRepositoryTrait,
};
pub use user_repo::UserRepository;
