//! 用户 CSV 导出处理器
//!
//! 与用户列表共用过滤条件，导出结果为带本地化表头的 CSV 附件

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use tracing::{info, instrument};

use steps_ledger::source_label;

use crate::{
    dto::UserQueryFilter,
    error::AdminError,
    handlers::user_view::{USER_FILTER_SQL, UserFilterBinds},
    state::AppState,
};

/// 导出文件的列头，顺序固定
const EXPORT_HEADERS: [&str; 19] = [
    "ID",
    "Telegram ID",
    "Имя пользователя",
    "Телефон",
    "Адрес электронной почты",
    "Баланс",
    "Шаги",
    "Всего прогулок",
    "Прогулки с коляской",
    "Прогулки с собакой",
    "Прогулки с коляской и собакой",
    "По рефералу",
    "Источник перехода",
    "Рефералов",
    "Покупки",
    "Дни/время прогулок",
    "Роль",
    "Активен",
    "Семья",
];

/// 导出行查询
///
/// 在列表查询列基础上补充：作为邀请人的归因数量，
/// 以及用户自己的归因来源（无来源的归因记作 referral）
const EXPORT_SELECT_SQL: &str = r#"
    SELECT
        u.id,
        u.telegram_id,
        u.username,
        u.phone,
        u.email,
        u.balance,
        u.step_count,
        u.walk_count_stroller,
        u.walk_count_dog,
        u.walk_count_stroller_dog,
        u.landing_source,
        f.name as family_name,
        EXISTS(SELECT 1 FROM referrals r WHERE r.user_id = u.id) as has_referral,
        (SELECT COUNT(*) FROM referrals r WHERE r.inviter_id = u.id) as referral_count,
        (SELECT COALESCE(r.referral_source, 'referral')
           FROM referrals r WHERE r.user_id = u.id) as referral_source,
        u.role,
        u.is_active
    FROM users u
    LEFT JOIN families f ON f.id = u.family_id
"#;

#[derive(sqlx::FromRow)]
struct ExportRow {
    id: i64,
    telegram_id: i64,
    username: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    balance: i64,
    step_count: i64,
    walk_count_stroller: i32,
    walk_count_dog: i32,
    walk_count_stroller_dog: i32,
    landing_source: Option<String>,
    family_name: Option<String>,
    has_referral: bool,
    referral_count: i64,
    referral_source: Option<String>,
    role: String,
    is_active: bool,
}

fn yes_no(value: bool) -> &'static str {
    if value { "Да" } else { "Нет" }
}

/// 拼装一行导出记录，与 [`EXPORT_HEADERS`] 列序一一对应
///
/// 来源列优先取归因来源，未被邀请的用户回落到落地来源
fn export_record(row: &ExportRow, purchases: &str, walk_schedule: &str) -> [String; 19] {
    let total_walks = row.walk_count_stroller + row.walk_count_dog + row.walk_count_stroller_dog;
    let raw_source = row
        .referral_source
        .as_deref()
        .or(row.landing_source.as_deref());

    [
        row.id.to_string(),
        row.telegram_id.to_string(),
        row.username.clone().unwrap_or_default(),
        row.phone.clone().unwrap_or_default(),
        row.email.clone().unwrap_or_default(),
        row.balance.to_string(),
        row.step_count.to_string(),
        total_walks.to_string(),
        row.walk_count_stroller.to_string(),
        row.walk_count_dog.to_string(),
        row.walk_count_stroller_dog.to_string(),
        yes_no(row.has_referral).to_string(),
        source_label(raw_source),
        row.referral_count.to_string(),
        purchases.to_string(),
        walk_schedule.to_string(),
        row.role.clone(),
        yes_no(row.is_active).to_string(),
        row.family_name.clone().unwrap_or_default(),
    ]
}

/// 导出用户列表为 CSV
///
/// GET /api/admin/users/export
///
/// 接受与列表接口相同的过滤条件，不分页，按用户 ID 升序输出
#[instrument(skip(state))]
pub async fn export_users(
    State(state): State<AppState>,
    Query(filter): Query<UserQueryFilter>,
) -> Result<impl IntoResponse, AdminError> {
    let binds = UserFilterBinds::from_filter(&filter);

    let sql = format!("{} {} ORDER BY u.id", EXPORT_SELECT_SQL, USER_FILTER_SQL);
    let rows = sqlx::query_as::<_, ExportRow>(&sql)
        .bind(&binds.search_pattern)
        .bind(&binds.role)
        .bind(binds.is_active)
        .bind(binds.has_family)
        .bind(binds.has_referral)
        .bind(&binds.landing_source)
        .bind(binds.walks_min)
        .bind(binds.walks_max)
        .fetch_all(&state.pool)
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&EXPORT_HEADERS)?;

    for row in &rows {
        let purchases = state.queries.purchases_summary(row.id).await?;
        let walk_schedule = state.queries.walk_schedule_summary(row.id).await?;
        writer.write_record(&export_record(row, &purchases, &walk_schedule))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AdminError::Csv(e.to_string()))?;

    info!(rows = rows.len(), "用户导出完成");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"users_export.csv\"",
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ExportRow {
        ExportRow {
            id: 7,
            telegram_id: 100500,
            username: Some("walker".to_string()),
            phone: None,
            email: None,
            balance: 1800,
            step_count: 12000,
            walk_count_stroller: 2,
            walk_count_dog: 5,
            walk_count_stroller_dog: 1,
            landing_source: Some("vk".to_string()),
            family_name: None,
            has_referral: false,
            referral_count: 3,
            referral_source: None,
            role: "USER".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_record_matches_header_order() {
        let record = export_record(&sample_row(), "Мяч×2", "Пн 8:00 (3)");
        assert_eq!(record.len(), EXPORT_HEADERS.len());
        assert_eq!(record[0], "7");
        assert_eq!(record[1], "100500");
        assert_eq!(record[7], "8");
        assert_eq!(record[11], "Нет");
        assert_eq!(record[12], "ВКонтакте");
        assert_eq!(record[13], "3");
        assert_eq!(record[14], "Мяч×2");
        assert_eq!(record[15], "Пн 8:00 (3)");
        assert_eq!(record[17], "Да");
    }

    #[test]
    fn test_record_referral_source_wins_over_landing() {
        let mut row = sample_row();
        row.has_referral = true;
        row.referral_source = Some("sticker".to_string());
        let record = export_record(&row, "", "");
        assert_eq!(record[11], "Да");
        assert_eq!(record[12], "Наклейки");
    }

    #[test]
    fn test_record_missing_fields_never_panic() {
        let row = ExportRow {
            id: 1,
            telegram_id: 2,
            username: None,
            phone: None,
            email: None,
            balance: 0,
            step_count: 0,
            walk_count_stroller: 0,
            walk_count_dog: 0,
            walk_count_stroller_dog: 0,
            landing_source: None,
            family_name: None,
            has_referral: false,
            referral_count: 0,
            referral_source: None,
            role: "USER".to_string(),
            is_active: false,
        };
        let record = export_record(&row, "", "");
        assert_eq!(record[2], "");
        assert_eq!(record[12], "—");
        assert_eq!(record[17], "Нет");
        assert_eq!(record[18], "");
    }

    #[test]
    fn test_csv_output_contains_headers_and_rows() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&EXPORT_HEADERS).unwrap();
        writer
            .write_record(&export_record(&sample_row(), "", ""))
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("ID,Telegram ID,"));
        assert!(text.contains("walker"));
        assert!(text.contains("ВКонтакте"));
    }
}
