//! 商品目录管理 API 处理器
//!
//! 分类与商品的增删改查，管理端可见未上架条目

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::{info, instrument};
use validator::Validate;

use steps_ledger::{CatalogCategory, Product};

use crate::{
    dto::{
        ApiResponse, CreateCategoryRequest, CreateProductRequest, CreatedResponse, PageResponse,
        PaginationParams, UpdateCategoryRequest, UpdateProductRequest,
    },
    error::AdminError,
    state::AppState,
};

// ==================== 分类管理 ====================

/// 获取分类列表
///
/// GET /api/admin/catalog/categories
///
/// 返回全部分类，包括已停用的
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CatalogCategory>>>, AdminError> {
    let categories = sqlx::query_as::<_, CatalogCategory>(
        r#"
        SELECT id, name, sort_order, is_active, created_at, updated_at
        FROM catalog_categories
        ORDER BY sort_order, id
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(categories)))
}

/// 创建分类
///
/// POST /api/admin/catalog/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<ApiResponse<CreatedResponse>>, AdminError> {
    req.validate()?;

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO catalog_categories (name, sort_order, is_active, created_at, updated_at)
        VALUES ($1, $2, TRUE, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(&req.name)
    .bind(req.sort_order.unwrap_or(0))
    .fetch_one(&state.pool)
    .await?;

    info!(category_id = row.0, name = %req.name, "分类已创建");

    Ok(Json(ApiResponse::success(CreatedResponse::new(row.0))))
}

/// 更新分类
///
/// PUT /api/admin/catalog/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CatalogCategory>>, AdminError> {
    req.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE catalog_categories
        SET name = COALESCE($2, name),
            sort_order = COALESCE($3, sort_order),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(req.sort_order)
    .bind(req.is_active)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::CategoryNotFound(id));
    }

    info!(category_id = id, "分类已更新");

    let category = sqlx::query_as::<_, CatalogCategory>(
        r#"
        SELECT id, name, sort_order, is_active, created_at, updated_at
        FROM catalog_categories
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(category)))
}

/// 删除分类
///
/// DELETE /api/admin/catalog/categories/{id}
///
/// 仅允许删除没有商品的分类
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let product_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    if product_count.0 > 0 {
        return Err(AdminError::Validation(format!(
            "分类下存在 {} 个商品，无法删除",
            product_count.0
        )));
    }

    let result = sqlx::query("DELETE FROM catalog_categories WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::CategoryNotFound(id));
    }

    info!(category_id = id, "分类已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}

// ==================== 商品管理 ====================

/// 获取商品列表（分页）
///
/// GET /api/admin/catalog/products
///
/// 可按分类过滤
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProductQueryFilter>,
) -> Result<Json<ApiResponse<PageResponse<Product>>>, AdminError> {
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE ($1::bigint IS NULL OR category_id = $1)",
    )
    .bind(filter.category_id)
    .fetch_one(&state.pool)
    .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.page_size,
        ))));
    }

    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, category_id, title, description, price_points, stock,
               is_active, created_at, updated_at
        FROM products
        WHERE ($1::bigint IS NULL OR category_id = $1)
        ORDER BY id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(filter.category_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.pool)
    .await?;

    let response = PageResponse::new(products, total.0, pagination.page, pagination.page_size);
    Ok(Json(ApiResponse::success(response)))
}

/// 商品列表查询过滤
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQueryFilter {
    pub category_id: Option<i64>,
}

/// 创建商品
///
/// POST /api/admin/catalog/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ApiResponse<CreatedResponse>>, AdminError> {
    req.validate()?;

    let category_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM catalog_categories WHERE id = $1)")
            .bind(req.category_id)
            .fetch_one(&state.pool)
            .await?;
    if !category_exists.0 {
        return Err(AdminError::CategoryNotFound(req.category_id));
    }

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO products
            (category_id, title, description, price_points, stock, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(req.category_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.price_points)
    .bind(req.stock)
    .fetch_one(&state.pool)
    .await?;

    info!(product_id = row.0, title = %req.title, "商品已创建");

    Ok(Json(ApiResponse::success(CreatedResponse::new(row.0))))
}

/// 更新商品
///
/// PUT /api/admin/catalog/products/{id}
///
/// description 和 stock 传 null 无法与「不修改」区分，
/// 清空这两个字段需要整体重建商品
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, AdminError> {
    req.validate()?;

    if let Some(category_id) = req.category_id {
        let category_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM catalog_categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&state.pool)
                .await?;
        if !category_exists.0 {
            return Err(AdminError::CategoryNotFound(category_id));
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE products
        SET category_id = COALESCE($2, category_id),
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            price_points = COALESCE($5, price_points),
            stock = COALESCE($6, stock),
            is_active = COALESCE($7, is_active),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.category_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.price_points)
    .bind(req.stock)
    .bind(req.is_active)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::ProductNotFound(id));
    }

    info!(product_id = id, "商品已更新");

    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, category_id, title, description, price_points, stock,
               is_active, created_at, updated_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(product)))
}

/// 删除商品
///
/// DELETE /api/admin/catalog/products/{id}
///
/// 有订单记录的商品只能下架，不能删除
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AdminError> {
    let order_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    if order_count.0 > 0 {
        return Err(AdminError::Validation(format!(
            "商品已出现在 {} 条订单明细中，无法删除，请改为下架",
            order_count.0
        )));
    }

    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AdminError::ProductNotFound(id));
    }

    info!(product_id = id, "商品已删除");

    Ok(Json(ApiResponse::<()>::success_empty()))
}
