//! 系数表仓储
//!
//! 基础系数与温度区间系数存放在两张表中，启动时整表加载，
//! 管理端每次修改后在同一事务内重新加载并校验，通过才提交

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Row};
use walk_reward_engine::{CoefficientTable, FormCoefficient, TemperatureBand, WalkForm};

use crate::error::Result;

/// 基础系数行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WalkFormCoefficientRow {
    pub id: i64,
    pub walk_form: WalkForm,
    pub coefficient: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<WalkFormCoefficientRow> for FormCoefficient {
    fn from(row: WalkFormCoefficientRow) -> Self {
        Self {
            walk_form: row.walk_form,
            coefficient: row.coefficient,
        }
    }
}

/// 温度区间系数行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureCoefficientRow {
    pub id: i64,
    pub walk_form: WalkForm,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub coefficient: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<TemperatureCoefficientRow> for TemperatureBand {
    fn from(row: TemperatureCoefficientRow) -> Self {
        Self {
            walk_form: row.walk_form,
            min_temp_c: row.min_temp_c,
            max_temp_c: row.max_temp_c,
            coefficient: row.coefficient,
        }
    }
}

/// 系数表仓储
pub struct CoefficientRepository {
    pool: PgPool,
}

impl CoefficientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 加载并校验完整系数表
    ///
    /// 校验失败（重复基础行、区间重叠等）作为配置故障报错
    pub async fn load_table(&self) -> Result<CoefficientTable> {
        let base = self.list_base().await?;
        let bands = self.list_temperature().await?;

        let table = CoefficientTable::from_parts(
            base.into_iter().map(FormCoefficient::from).collect(),
            bands.into_iter().map(TemperatureBand::from).collect(),
        )?;

        Ok(table)
    }

    /// 列出全部基础系数行
    pub async fn list_base(&self) -> Result<Vec<WalkFormCoefficientRow>> {
        let rows = sqlx::query_as::<_, WalkFormCoefficientRow>(
            r#"
            SELECT id, walk_form, coefficient, updated_at
            FROM walk_form_coefficients
            ORDER BY walk_form
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 列出全部温度区间系数行
    pub async fn list_temperature(&self) -> Result<Vec<TemperatureCoefficientRow>> {
        let rows = sqlx::query_as::<_, TemperatureCoefficientRow>(
            r#"
            SELECT id, walk_form, min_temp_c, max_temp_c, coefficient, updated_at
            FROM temperature_coefficients
            ORDER BY walk_form, min_temp_c
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ==================== 事务操作 ====================

    /// 在事务内加载并校验完整系数表
    ///
    /// 管理端写入后调用，校验不通过则回滚写入
    pub async fn load_table_in_tx(tx: &mut PgConnection) -> Result<CoefficientTable> {
        let base = sqlx::query_as::<_, WalkFormCoefficientRow>(
            r#"
            SELECT id, walk_form, coefficient, updated_at
            FROM walk_form_coefficients
            ORDER BY walk_form
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let bands = sqlx::query_as::<_, TemperatureCoefficientRow>(
            r#"
            SELECT id, walk_form, min_temp_c, max_temp_c, coefficient, updated_at
            FROM temperature_coefficients
            ORDER BY walk_form, min_temp_c
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let table = CoefficientTable::from_parts(
            base.into_iter().map(FormCoefficient::from).collect(),
            bands.into_iter().map(TemperatureBand::from).collect(),
        )?;

        Ok(table)
    }

    /// 整表替换基础系数
    pub async fn replace_base_in_tx(
        tx: &mut PgConnection,
        rows: &[FormCoefficient],
    ) -> Result<()> {
        sqlx::query("DELETE FROM walk_form_coefficients")
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO walk_form_coefficients (walk_form, coefficient, updated_at)
                VALUES ($1, $2, NOW())
                "#,
            )
            .bind(row.walk_form)
            .bind(row.coefficient)
            .execute(&mut *tx)
            .await?;
        }

        Ok(())
    }

    /// 新增温度区间系数，返回生成的 id
    pub async fn insert_temperature_in_tx(
        tx: &mut PgConnection,
        band: &TemperatureBand,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO temperature_coefficients
                (walk_form, min_temp_c, max_temp_c, coefficient, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id
            "#,
        )
        .bind(band.walk_form)
        .bind(band.min_temp_c)
        .bind(band.max_temp_c)
        .bind(band.coefficient)
        .fetch_one(&mut *tx)
        .await?;

        Ok(row.get("id"))
    }

    /// 更新温度区间系数，返回是否命中
    pub async fn update_temperature_in_tx(
        tx: &mut PgConnection,
        id: i64,
        band: &TemperatureBand,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE temperature_coefficients
            SET walk_form = $2, min_temp_c = $3, max_temp_c = $4,
                coefficient = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(band.walk_form)
        .bind(band.min_temp_c)
        .bind(band.max_temp_c)
        .bind(band.coefficient)
        .execute(&mut *tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 删除温度区间系数，返回是否命中
    pub async fn delete_temperature_in_tx(tx: &mut PgConnection, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM temperature_coefficients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
