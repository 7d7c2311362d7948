//! Order Point Repository
//!
//! An order opened on a dining table: lines snapshot the product name and
//! effective unit price at the moment they are added, so later catalog
//! edits never change what a table owes.
//!
//! Stock is decremented with a conditional UPDATE (`stock >= amount`), so
//! two racing orders can never oversell. Order creation is all-or-nothing;
//! adding products to an existing order applies lines in request order and
//! keeps the already-applied ones when a later line runs out of stock.

use super::{RepoError, RepoResult};
use crate::utils::query_builder::QueryBuilder;
use shared::models::{
    discount_amount, OrderLine, OrderLineInput, OrderLinesRemove, OrderPoint, OrderPointCreate,
    OrderPointProcess, OrderPointStatus, OrderPointUpdate, Product, SendToKitchen,
};
use shared::util::now_millis;
use shared::ErrorCode;
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, company_id, point_of_sale_id, table_id, cash_session_id, user_id, status, subtotal, discount, total, payment_method_id, notes, processed_at, processed_by, created_at, updated_at";
const LINE_COLUMNS: &str = "id, order_point_id, product_id, product_name, amount, price, discount_rate, status, note, options_selected, sent_to_kitchen_at";

/// Optional list filters; every field is independently combinable.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub table_id: Option<i64>,
    pub status: Option<OrderPointStatus>,
    pub point_of_sale_id: Option<i64>,
    /// Exact subtotal match
    pub subtotal: Option<f64>,
    pub user_id: Option<i64>,
    /// `[start, end)` window in Unix millis over `created_at`
    pub date_range: Option<(i64, i64)>,
}

fn filter_builder(company_id: i64, filter: &OrderFilter) -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder.add_condition("company_id = ?").bind_i64(company_id);
    if let Some(table_id) = filter.table_id {
        builder.add_condition("table_id = ?").bind_i64(table_id);
    }
    if let Some(status) = filter.status {
        builder
            .add_condition("status = ?")
            .bind_text(status.as_str().to_string());
    }
    if let Some(pos_id) = filter.point_of_sale_id {
        builder.add_condition("point_of_sale_id = ?").bind_i64(pos_id);
    }
    if let Some(subtotal) = filter.subtotal {
        builder.add_condition("subtotal = ?").bind_f64(subtotal);
    }
    if let Some(user_id) = filter.user_id {
        builder.add_condition("user_id = ?").bind_i64(user_id);
    }
    if let Some((start, end)) = filter.date_range {
        builder.add_condition("created_at >= ?").bind_i64(start);
        builder.add_condition("created_at < ?").bind_i64(end);
    }
    builder
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderPoint>> {
    let order =
        sqlx::query_as::<_, OrderPoint>(&format!("SELECT {COLUMNS} FROM order_point WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(order)
}

/// Order with its lines populated.
pub async fn find_with_lines(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderPoint>> {
    let Some(mut order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    order.products = find_lines(pool, id).await?;
    Ok(Some(order))
}

pub async fn find_lines(pool: &SqlitePool, order_point_id: i64) -> RepoResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM order_line WHERE order_point_id = ? ORDER BY id"
    ))
    .bind(order_point_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Populate `products` on a batch of orders with one IN query.
async fn attach_lines(pool: &SqlitePool, mut orders: Vec<OrderPoint>) -> RepoResult<Vec<OrderPoint>> {
    if orders.is_empty() {
        return Ok(orders);
    }
    let placeholders = vec!["?"; orders.len()].join(", ");
    let sql = format!(
        "SELECT {LINE_COLUMNS} FROM order_line WHERE order_point_id IN ({placeholders}) ORDER BY id"
    );
    let mut query = sqlx::query_as::<_, OrderLine>(&sql);
    for order in &orders {
        query = query.bind(order.id);
    }
    let lines = query.fetch_all(pool).await?;

    let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_point_id).or_default().push(line);
    }
    for order in &mut orders {
        order.products = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

/// PAID orders of a cash session, lines populated. Report generation
/// aggregates over this set.
pub async fn find_paid_by_session(
    pool: &SqlitePool,
    cash_session_id: i64,
) -> RepoResult<Vec<OrderPoint>> {
    let orders = sqlx::query_as::<_, OrderPoint>(&format!(
        "SELECT {COLUMNS} FROM order_point WHERE cash_session_id = ? AND status = 'PAID' ORDER BY id"
    ))
    .bind(cash_session_id)
    .fetch_all(pool)
    .await?;
    attach_lines(pool, orders).await
}

fn options_json(input: &OrderLineInput) -> Option<String> {
    input
        .options_selected
        .as_ref()
        .and_then(|opts| serde_json::to_string(opts).ok())
}

/// PAID and CANCELED orders reject every mutation.
fn finalized_conflict(order: &OrderPoint) -> RepoError {
    if order.status == OrderPointStatus::Canceled {
        RepoError::Conflict(
            ErrorCode::OrderAlreadyCanceled,
            format!("Order {} is canceled", order.id),
        )
    } else {
        RepoError::Conflict(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already paid", order.id),
        )
    }
}

async fn insert_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_point_id: i64,
    input: &OrderLineInput,
    product_name: &str,
    price: f64,
    discount_rate: f64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_line (order_point_id, product_id, product_name, amount, price, discount_rate, status, note, options_selected) VALUES (?, ?, ?, ?, ?, ?, 'PENDING', ?, ?)",
    )
    .bind(order_point_id)
    .bind(input.product_id)
    .bind(product_name)
    .bind(input.amount)
    .bind(price)
    .bind(discount_rate)
    .bind(&input.note)
    .bind(options_json(input))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn stamp_subtotal(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_point_id: i64,
    subtotal: f64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE order_point SET subtotal = ?, updated_at = ? WHERE id = ?")
        .bind(subtotal)
        .bind(now)
        .bind(order_point_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Open an order on a table.
///
/// Unknown and deleted products are skipped; an order with no orderable
/// product at all is rejected. When the company tracks stock, the whole
/// request is checked against current stock first, so creation is
/// all-or-nothing. The order row, its lines, the stock decrements and the
/// table occupation commit together.
pub async fn create(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    data: OrderPointCreate,
    stock_active: bool,
) -> RepoResult<OrderPoint> {
    let ids: Vec<i64> = data.products.iter().map(|line| line.product_id).collect();
    let products = super::product::find_active_by_ids(pool, company_id, &ids).await?;

    let lines: Vec<_> = data
        .products
        .iter()
        .filter_map(|input| {
            match products.iter().find(|p| p.id == input.product_id) {
                Some(product) => Some((input, product)),
                None => {
                    tracing::warn!("Skipping unknown product {} on order create", input.product_id);
                    None
                }
            }
        })
        .collect();
    if lines.is_empty() {
        return Err(RepoError::NotFound(
            ErrorCode::ProductNotFound,
            "No orderable products in the request".to_string(),
        ));
    }

    // Amounts summed per product, so one request cannot slip past the
    // stock check by splitting a product across lines.
    let mut needed: Vec<(&Product, i64)> = Vec::new();
    for (input, product) in &lines {
        match needed.iter_mut().find(|(p, _)| p.id == input.product_id) {
            Some((_, amount)) => *amount += input.amount,
            None => needed.push((product, input.amount)),
        }
    }
    if stock_active {
        for (product, amount) in &needed {
            if product.stock < *amount {
                return Err(RepoError::Conflict(
                    ErrorCode::InsufficientStock,
                    format!(
                        "Insufficient stock for {}: {} requested, {} available",
                        product.name, amount, product.stock
                    ),
                ));
            }
        }
    }

    let session = super::cash_session::find_active(pool, data.point_of_sale_id, None).await?;
    let subtotal: f64 = lines
        .iter()
        .map(|(input, product)| input.amount as f64 * product.effective_point_price())
        .sum();
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_point (company_id, point_of_sale_id, table_id, cash_session_id, user_id, status, subtotal, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', ?6, ?7, ?7) RETURNING id",
    )
    .bind(company_id)
    .bind(data.point_of_sale_id)
    .bind(data.table_id)
    .bind(session.as_ref().map(|s| s.id))
    .bind(user_id)
    .bind(subtotal)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for (input, product) in &lines {
        insert_line(
            &mut tx,
            order_id,
            input,
            &product.name,
            product.effective_point_price(),
            product.discount_rate,
        )
        .await?;
    }
    if stock_active {
        for (product, amount) in &needed {
            // Pre-checked above; a concurrent decrement can still win
            if !super::product::take_stock(&mut tx, product.id, *amount, now).await? {
                return Err(RepoError::Conflict(
                    ErrorCode::InsufficientStock,
                    format!("Insufficient stock for {}", product.name),
                ));
            }
        }
    }
    super::dining_table::occupy(&mut tx, data.table_id, order_id, now).await?;
    tx.commit().await?;

    find_with_lines(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
}

/// Add products to an open order.
///
/// A product already on the order merges into its line and keeps the
/// original snapshot price; new products snapshot the current effective
/// price. Note and options only overwrite when provided. Lines apply in
/// request order: when one runs out of stock, the ones already applied
/// stay, the order keeps the partial subtotal and the call reports the
/// failing product.
pub async fn update(
    pool: &SqlitePool,
    order: &OrderPoint,
    data: OrderPointUpdate,
    stock_active: bool,
) -> RepoResult<OrderPoint> {
    if order.is_finalized() {
        return Err(finalized_conflict(order));
    }

    let existing = find_lines(pool, order.id).await?;
    let ids: Vec<i64> = data.products.iter().map(|line| line.product_id).collect();
    let products = super::product::find_active_by_ids(pool, order.company_id, &ids).await?;
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let mut delta = 0.0;
    for input in &data.products {
        if let Some(line) = existing.iter().find(|l| l.product_id == input.product_id) {
            if stock_active
                && !super::product::take_stock(&mut tx, input.product_id, input.amount, now).await?
            {
                stamp_subtotal(&mut tx, order.id, order.subtotal + delta, now).await?;
                tx.commit().await?;
                return Err(RepoError::Conflict(
                    ErrorCode::InsufficientStock,
                    format!("Insufficient stock for {}", line.product_name),
                ));
            }
            sqlx::query(
                "UPDATE order_line SET amount = amount + ?, note = COALESCE(?, note), options_selected = COALESCE(?, options_selected) WHERE id = ?",
            )
            .bind(input.amount)
            .bind(&input.note)
            .bind(options_json(input))
            .bind(line.id)
            .execute(&mut *tx)
            .await?;
            delta += input.amount as f64 * line.price;
        } else if let Some(product) = products.iter().find(|p| p.id == input.product_id) {
            if stock_active
                && !super::product::take_stock(&mut tx, product.id, input.amount, now).await?
            {
                stamp_subtotal(&mut tx, order.id, order.subtotal + delta, now).await?;
                tx.commit().await?;
                return Err(RepoError::Conflict(
                    ErrorCode::InsufficientStock,
                    format!("Insufficient stock for {}", product.name),
                ));
            }
            insert_line(
                &mut tx,
                order.id,
                input,
                &product.name,
                product.effective_point_price(),
                product.discount_rate,
            )
            .await?;
            delta += input.amount as f64 * product.effective_point_price();
        } else {
            tracing::warn!(
                "Skipping unknown product {} on order {}",
                input.product_id,
                order.id
            );
        }
    }
    stamp_subtotal(&mut tx, order.id, order.subtotal + delta, now).await?;
    tx.commit().await?;

    find_with_lines(pool, order.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload order".to_string()))
}

/// Remove products from an open order.
///
/// Deletes every line of each requested product, subtracts their
/// contribution from the subtotal and restores stock when the company
/// tracks it. Products not on the order are skipped.
pub async fn remove_lines(
    pool: &SqlitePool,
    order: &OrderPoint,
    data: OrderLinesRemove,
    stock_active: bool,
) -> RepoResult<OrderPoint> {
    if order.is_finalized() {
        return Err(finalized_conflict(order));
    }

    let existing = find_lines(pool, order.id).await?;
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let mut handled: Vec<i64> = Vec::new();
    let mut delta = 0.0;
    for &product_id in &data.product_ids {
        if handled.contains(&product_id) {
            tracing::warn!(
                "Product {product_id} repeated in remove request for order {}",
                order.id
            );
            continue;
        }
        let lines: Vec<&OrderLine> = existing
            .iter()
            .filter(|l| l.product_id == product_id)
            .collect();
        if lines.is_empty() {
            tracing::warn!("Product {product_id} is not on order {}", order.id);
            continue;
        }
        handled.push(product_id);

        sqlx::query("DELETE FROM order_line WHERE order_point_id = ? AND product_id = ?")
            .bind(order.id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        for line in lines {
            delta += line.amount as f64 * line.price;
            if stock_active {
                super::product::restore_stock(&mut tx, product_id, line.amount, now).await?;
            }
        }
    }
    stamp_subtotal(&mut tx, order.id, order.subtotal - delta, now).await?;
    tx.commit().await?;

    find_with_lines(pool, order.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload order".to_string()))
}

/// Send the PENDING lines of the requested products to the kitchen.
///
/// Marks them IN_KITCHEN with a dispatch timestamp and moves the order to
/// PREPARING. Fails when no requested line is eligible.
pub async fn send_to_kitchen(
    pool: &SqlitePool,
    order: &OrderPoint,
    data: SendToKitchen,
) -> RepoResult<OrderPoint> {
    if order.is_finalized() {
        return Err(finalized_conflict(order));
    }
    if data.product_ids.is_empty() {
        return Err(RepoError::Conflict(
            ErrorCode::NoLinesEligible,
            format!("No pending lines to send for order {}", order.id),
        ));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;

    let placeholders = vec!["?"; data.product_ids.len()].join(", ");
    let sql = format!(
        "UPDATE order_line SET status = 'IN_KITCHEN', sent_to_kitchen_at = ? WHERE order_point_id = ? AND status = 'PENDING' AND product_id IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql).bind(now).bind(order.id);
    for product_id in &data.product_ids {
        query = query.bind(product_id);
    }
    let rows = query.execute(&mut *tx).await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::NoLinesEligible,
            format!("No pending lines to send for order {}", order.id),
        ));
    }

    sqlx::query("UPDATE order_point SET status = 'PREPARING', updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(order.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    find_with_lines(pool, order.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload order".to_string()))
}

/// Take payment for an order.
///
/// Applies the discount against the subtotal (percentage up to 100, fixed
/// amount above, clamped to the subtotal), stamps the payment fields,
/// forces every line READY and frees the table, all in one transaction.
/// The status UPDATE is guarded, so a racing second payment loses.
pub async fn process(
    pool: &SqlitePool,
    order: &OrderPoint,
    data: OrderPointProcess,
    processed_by: i64,
) -> RepoResult<OrderPoint> {
    if order.is_finalized() {
        return Err(finalized_conflict(order));
    }

    let amount = discount_amount(order.subtotal, data.discount.unwrap_or(0.0));
    let total = order.subtotal - amount;
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE order_point SET status = 'PAID', discount = ?1, total = ?2, payment_method_id = ?3, processed_at = ?4, processed_by = ?5, notes = COALESCE(?6, notes), updated_at = ?4 WHERE id = ?7 AND status NOT IN ('PAID', 'CANCELED')",
    )
    .bind(amount)
    .bind(total)
    .bind(data.payment_method_id)
    .bind(now)
    .bind(processed_by)
    .bind(&data.notes)
    .bind(order.id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already finalized", order.id),
        ));
    }

    sqlx::query("UPDATE order_line SET status = 'READY' WHERE order_point_id = ?")
        .bind(order.id)
        .execute(&mut *tx)
        .await?;
    super::dining_table::free(&mut tx, order.table_id, now).await?;
    tx.commit().await?;

    find_with_lines(pool, order.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload order".to_string()))
}

/// One page of orders plus the total match count, newest first, lines
/// populated.
pub async fn find_with_pagination(
    pool: &SqlitePool,
    company_id: i64,
    filter: &OrderFilter,
    page: u32,
    limit: u32,
) -> RepoResult<(Vec<OrderPoint>, u64)> {
    let builder = filter_builder(company_id, filter);
    let where_clause = builder.build_where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM order_point{where_clause}");
    let total = builder
        .apply_bindings_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool)
        .await? as u64;

    let items_sql = format!(
        "SELECT {COLUMNS} FROM order_point{where_clause} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    let orders = builder
        .apply_bindings(sqlx::query_as::<_, OrderPoint>(&items_sql))
        .bind(limit as i64)
        .bind(((page - 1) * limit) as i64)
        .fetch_all(pool)
        .await?;
    let orders = attach_lines(pool, orders).await?;

    Ok((orders, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderLineStatus;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO company (id, name, is_stock_active) VALUES (1, 'Demo Co', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO point_of_sale (id, company_id, name) VALUES (1, 1, 'Front Bar')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO dining_table (id, company_id, point_of_sale_id, number) VALUES
                (1, 1, 1, 1),
                (2, 1, 1, 2)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO payment_method (id, company_id, name, is_active) VALUES (1, 1, 'Cash', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO product (id, company_id, name, category, point_price, discount_rate, stock) VALUES
                (1, 1, 'Burger', 'Food', 10.0, 0, 5),
                (2, 1, 'Fries', 'Food', 4.0, 0, 100),
                (3, 1, 'Lemonade', 'Drinks', 5.0, 20.0, 100)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO product (id, company_id, name, point_price, stock, is_deleted) VALUES (4, 1, 'Old Dish', 9.0, 100, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn line(product_id: i64, amount: i64) -> OrderLineInput {
        OrderLineInput {
            product_id,
            amount,
            note: None,
            options_selected: None,
        }
    }

    fn create_data(table_id: i64, products: Vec<OrderLineInput>) -> OrderPointCreate {
        OrderPointCreate {
            table_id,
            point_of_sale_id: 1,
            products,
        }
    }

    async fn stock_of(pool: &SqlitePool, product_id: i64) -> i64 {
        sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_snapshots_lines_and_occupies_table() {
        let pool = test_pool().await;
        let order = create(
            &pool,
            1,
            7,
            create_data(1, vec![line(1, 2), line(3, 1)]),
            true,
        )
        .await
        .unwrap();

        assert_eq!(order.status, OrderPointStatus::Pending);
        assert_eq!(order.products.len(), 2);
        // Burger at list price, Lemonade at 20% off
        assert_eq!(order.products[0].price, 10.0);
        assert_eq!(order.products[1].price, 4.0);
        assert_eq!(order.subtotal, 24.0);
        assert_eq!(stock_of(&pool, 1).await, 3);

        let (status, active): (String, Option<i64>) = sqlx::query_as(
            "SELECT status, active_order_point_id FROM dining_table WHERE id = 1",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "IN_USE");
        assert_eq!(active, Some(order.id));
    }

    #[tokio::test]
    async fn test_create_skips_unknown_and_deleted_products() {
        let pool = test_pool().await;
        let order = create(
            &pool,
            1,
            7,
            create_data(1, vec![line(2, 1), line(4, 1), line(99, 1)]),
            true,
        )
        .await
        .unwrap();
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].product_id, 2);

        let err = create(&pool, 1, 7, create_data(2, vec![line(99, 1)]), true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound(ErrorCode::ProductNotFound, _)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_insufficient_stock_before_writing() {
        let pool = test_pool().await;
        // 3 + 3 of the same product exceeds the 5 in stock
        let err = create(
            &pool,
            1,
            7,
            create_data(1, vec![line(1, 3), line(1, 3)]),
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::InsufficientStock, _)
        ));
        assert_eq!(stock_of(&pool, 1).await, 5);

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_point")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn test_create_ignores_stock_when_tracking_disabled() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(1, 50)]), false)
            .await
            .unwrap();
        assert_eq!(order.subtotal, 500.0);
        assert_eq!(stock_of(&pool, 1).await, 5);
    }

    #[tokio::test]
    async fn test_create_tags_open_cash_session() {
        let pool = test_pool().await;
        let before = create(&pool, 1, 7, create_data(1, vec![line(2, 1)]), true)
            .await
            .unwrap();
        assert_eq!(before.cash_session_id, None);

        let session = super::super::cash_session::create(
            &pool,
            1,
            7,
            shared::models::CashSessionCreate {
                point_of_sale_id: 1,
                initial_cash: 0.0,
                notes: None,
            },
            5,
        )
        .await
        .unwrap();
        let after = create(&pool, 1, 7, create_data(2, vec![line(2, 1)]), true)
            .await
            .unwrap();
        assert_eq!(after.cash_session_id, Some(session.id));
    }

    #[tokio::test]
    async fn test_update_merges_and_checks_stock_per_line() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(1, 3)]), true)
            .await
            .unwrap();
        assert_eq!(order.subtotal, 30.0);
        assert_eq!(stock_of(&pool, 1).await, 2);

        // Only 2 left, adding 4 more must fail and change nothing
        let err = update(
            &pool,
            &order,
            OrderPointUpdate {
                products: vec![line(1, 4)],
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::InsufficientStock, _)
        ));
        assert_eq!(stock_of(&pool, 1).await, 2);
        let unchanged = find_with_lines(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.subtotal, 30.0);
        assert_eq!(unchanged.products[0].amount, 3);

        // Adding 2 merges into the existing line
        let updated = update(
            &pool,
            &order,
            OrderPointUpdate {
                products: vec![line(1, 2)],
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(updated.products.len(), 1);
        assert_eq!(updated.products[0].amount, 5);
        assert_eq!(updated.subtotal, 50.0);
        assert_eq!(stock_of(&pool, 1).await, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_applied_lines_on_mid_batch_failure() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(2, 1)]), true)
            .await
            .unwrap();

        // Fries apply, then the Burger line exceeds stock
        let err = update(
            &pool,
            &order,
            OrderPointUpdate {
                products: vec![line(2, 2), line(1, 9)],
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::InsufficientStock, _)
        ));

        let reloaded = find_with_lines(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.products.len(), 1);
        assert_eq!(reloaded.products[0].amount, 3);
        assert_eq!(reloaded.subtotal, 12.0);
        assert_eq!(stock_of(&pool, 2).await, 97);
        assert_eq!(stock_of(&pool, 1).await, 5);
    }

    #[tokio::test]
    async fn test_update_merge_keeps_snapshot_price() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(2, 1)]), true)
            .await
            .unwrap();

        // Catalog price changes after the order was opened
        sqlx::query("UPDATE product SET point_price = 8.0 WHERE id = 2")
            .execute(&pool)
            .await
            .unwrap();

        let updated = update(
            &pool,
            &order,
            OrderPointUpdate {
                products: vec![line(2, 1)],
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(updated.products[0].price, 4.0);
        assert_eq!(updated.subtotal, 8.0);
    }

    #[tokio::test]
    async fn test_update_overwrites_note_only_when_provided() {
        let pool = test_pool().await;
        let order = create(
            &pool,
            1,
            7,
            create_data(
                1,
                vec![OrderLineInput {
                    product_id: 2,
                    amount: 1,
                    note: Some("no salt".into()),
                    options_selected: None,
                }],
            ),
            true,
        )
        .await
        .unwrap();

        let updated = update(
            &pool,
            &order,
            OrderPointUpdate {
                products: vec![line(2, 1)],
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(updated.products[0].note.as_deref(), Some("no salt"));

        let updated = update(
            &pool,
            &updated,
            OrderPointUpdate {
                products: vec![OrderLineInput {
                    product_id: 2,
                    amount: 1,
                    note: Some("extra salt".into()),
                    options_selected: None,
                }],
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(updated.products[0].note.as_deref(), Some("extra salt"));
    }

    #[tokio::test]
    async fn test_remove_restores_stock_and_subtotal() {
        let pool = test_pool().await;
        let order = create(
            &pool,
            1,
            7,
            create_data(1, vec![line(1, 2), line(2, 3)]),
            true,
        )
        .await
        .unwrap();
        assert_eq!(order.subtotal, 32.0);
        assert_eq!(stock_of(&pool, 1).await, 3);

        // Unknown and duplicate ids are skipped
        let updated = remove_lines(
            &pool,
            &order,
            OrderLinesRemove {
                product_ids: vec![1, 99, 1],
            },
            true,
        )
        .await
        .unwrap();
        assert_eq!(updated.products.len(), 1);
        assert_eq!(updated.products[0].product_id, 2);
        assert_eq!(updated.subtotal, 12.0);
        assert_eq!(stock_of(&pool, 1).await, 5);
    }

    #[tokio::test]
    async fn test_send_to_kitchen_marks_lines_and_order() {
        let pool = test_pool().await;
        let order = create(
            &pool,
            1,
            7,
            create_data(1, vec![line(1, 1), line(2, 1)]),
            true,
        )
        .await
        .unwrap();

        let sent = send_to_kitchen(
            &pool,
            &order,
            SendToKitchen {
                product_ids: vec![1],
            },
        )
        .await
        .unwrap();
        assert_eq!(sent.status, OrderPointStatus::Preparing);
        let burger = sent.products.iter().find(|l| l.product_id == 1).unwrap();
        assert_eq!(burger.status, OrderLineStatus::InKitchen);
        assert!(burger.sent_to_kitchen_at.is_some());
        let fries = sent.products.iter().find(|l| l.product_id == 2).unwrap();
        assert_eq!(fries.status, OrderLineStatus::Pending);
        assert!(fries.sent_to_kitchen_at.is_none());

        // Re-sending the same line finds nothing PENDING
        let err = send_to_kitchen(
            &pool,
            &sent,
            SendToKitchen {
                product_ids: vec![1],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::NoLinesEligible, _)
        ));
    }

    #[tokio::test]
    async fn test_process_pays_discounts_and_frees_table() {
        let pool = test_pool().await;
        // 20 Burgers at 10.0 make a 200.0 subtotal
        let order = create(&pool, 1, 7, create_data(1, vec![line(1, 20)]), false)
            .await
            .unwrap();
        assert_eq!(order.subtotal, 200.0);

        let paid = process(
            &pool,
            &order,
            OrderPointProcess {
                payment_method_id: 1,
                discount: Some(20.0),
                notes: Some("birthday".into()),
            },
            8,
        )
        .await
        .unwrap();
        assert_eq!(paid.status, OrderPointStatus::Paid);
        assert_eq!(paid.discount, 40.0);
        assert_eq!(paid.total, 160.0);
        assert_eq!(paid.payment_method_id, Some(1));
        assert_eq!(paid.processed_by, Some(8));
        assert!(paid.processed_at.is_some());
        assert_eq!(paid.notes.as_deref(), Some("birthday"));
        assert!(paid.products.iter().all(|l| l.status == OrderLineStatus::Ready));

        let status: String = sqlx::query_scalar("SELECT status FROM dining_table WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "FREE");

        let err = process(
            &pool,
            &paid,
            OrderPointProcess {
                payment_method_id: 1,
                discount: None,
                notes: None,
            },
            8,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::OrderAlreadyPaid, _)
        ));
    }

    #[tokio::test]
    async fn test_process_clamps_fixed_discount() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(1, 20)]), false)
            .await
            .unwrap();

        let paid = process(
            &pool,
            &order,
            OrderPointProcess {
                payment_method_id: 1,
                discount: Some(250.0),
                notes: None,
            },
            7,
        )
        .await
        .unwrap();
        assert_eq!(paid.discount, 200.0);
        assert_eq!(paid.total, 0.0);
    }

    #[tokio::test]
    async fn test_process_full_percentage_waives_order() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(1, 20)]), false)
            .await
            .unwrap();

        let paid = process(
            &pool,
            &order,
            OrderPointProcess {
                payment_method_id: 1,
                discount: Some(100.0),
                notes: None,
            },
            7,
        )
        .await
        .unwrap();
        assert_eq!(paid.discount, 200.0);
        assert_eq!(paid.total, 0.0);
    }

    #[tokio::test]
    async fn test_finalized_orders_reject_mutations() {
        let pool = test_pool().await;
        let order = create(&pool, 1, 7, create_data(1, vec![line(2, 1)]), true)
            .await
            .unwrap();
        let paid = process(
            &pool,
            &order,
            OrderPointProcess {
                payment_method_id: 1,
                discount: None,
                notes: None,
            },
            7,
        )
        .await
        .unwrap();

        let err = update(
            &pool,
            &paid,
            OrderPointUpdate {
                products: vec![line(2, 1)],
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Conflict(ErrorCode::OrderAlreadyPaid, _)
        ));

        let err = remove_lines(
            &pool,
            &paid,
            OrderLinesRemove {
                product_ids: vec![2],
            },
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ErrorCode::OrderAlreadyPaid, _)));

        let err = send_to_kitchen(
            &pool,
            &paid,
            SendToKitchen {
                product_ids: vec![2],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(ErrorCode::OrderAlreadyPaid, _)));
    }

    #[tokio::test]
    async fn test_pagination_and_filters() {
        let pool = test_pool().await;
        let o1 = create(&pool, 1, 7, create_data(1, vec![line(1, 2)]), true)
            .await
            .unwrap();
        create(&pool, 1, 8, create_data(2, vec![line(2, 1)]), true)
            .await
            .unwrap();
        process(
            &pool,
            &o1,
            OrderPointProcess {
                payment_method_id: 1,
                discount: None,
                notes: None,
            },
            7,
        )
        .await
        .unwrap();

        let (all, total) = find_with_pagination(&pool, 1, &OrderFilter::default(), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(all.iter().all(|o| !o.products.is_empty()));

        let paid_filter = OrderFilter {
            status: Some(OrderPointStatus::Paid),
            ..Default::default()
        };
        let (paid, total) = find_with_pagination(&pool, 1, &paid_filter, 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(paid[0].id, o1.id);

        let table_filter = OrderFilter {
            table_id: Some(2),
            ..Default::default()
        };
        let (by_table, _) = find_with_pagination(&pool, 1, &table_filter, 1, 10)
            .await
            .unwrap();
        assert_eq!(by_table.len(), 1);
        assert_eq!(by_table[0].table_id, 2);

        let subtotal_filter = OrderFilter {
            subtotal: Some(20.0),
            ..Default::default()
        };
        let (by_subtotal, _) = find_with_pagination(&pool, 1, &subtotal_filter, 1, 10)
            .await
            .unwrap();
        assert_eq!(by_subtotal.len(), 1);
        assert_eq!(by_subtotal[0].subtotal, 20.0);

        // Another company sees nothing
        let (other, total) = find_with_pagination(&pool, 2, &OrderFilter::default(), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_find_paid_by_session_groups_lines() {
        let pool = test_pool().await;
        let session = super::super::cash_session::create(
            &pool,
            1,
            7,
            shared::models::CashSessionCreate {
                point_of_sale_id: 1,
                initial_cash: 0.0,
                notes: None,
            },
            5,
        )
        .await
        .unwrap();

        let o1 = create(&pool, 1, 7, create_data(1, vec![line(1, 1), line(2, 2)]), true)
            .await
            .unwrap();
        let o2 = create(&pool, 1, 7, create_data(2, vec![line(2, 1)]), true)
            .await
            .unwrap();
        process(
            &pool,
            &o1,
            OrderPointProcess {
                payment_method_id: 1,
                discount: None,
                notes: None,
            },
            7,
        )
        .await
        .unwrap();

        // o2 stays PENDING and must not appear
        let paid = find_paid_by_session(&pool, session.id).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, o1.id);
        assert_eq!(paid[0].products.len(), 2);
        assert_ne!(paid[0].id, o2.id);
    }
}
