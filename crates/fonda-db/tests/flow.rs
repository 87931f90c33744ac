//! End-to-end flow tests against an in-memory database.
//!
//! Each test builds its own isolated database, walks a real operational flow
//! (purchases, orders, payments, counts, cash sessions), and checks both the
//! visible result and the ledger invariants behind it.

use chrono::Utc;
use fonda_core::{
    source, CoreError, MovementKind, OrderStatus, PaymentMethod, Role, TableState,
};
use fonda_db::{
    CountLineInput, Database, DbConfig, DbError, InitialStock, PurchaseLineInput,
};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Unwraps the domain error behind a DbError, panicking on anything else.
fn domain_err(err: DbError) -> CoreError {
    match err {
        DbError::Domain(core) => core,
        other => panic!("expected domain error, got: {other:?}"),
    }
}

// =============================================================================
// Ledger: purchases, outputs, adjustments
// =============================================================================

#[tokio::test]
async fn purchase_averaging_recomputes_weighted_mean() {
    let db = test_db().await;
    let product = db.catalog().create_product("Tomate", "kg", None).await.unwrap();

    db.inventory()
        .register_purchase(&product.id, 10.0, 2.0, source::PURCHASE, "doc-1")
        .await
        .unwrap();
    db.inventory()
        .register_purchase(&product.id, 10.0, 4.0, source::PURCHASE, "doc-2")
        .await
        .unwrap();

    let product = db.products().get_by_id(&product.id).await.unwrap();
    assert_eq!(product.stock, 20.0);
    assert_eq!(product.avg_cost, 3.0);

    let kardex = db.products().kardex(&product.id).await.unwrap();
    assert_eq!(kardex.len(), 2);
    assert_eq!(kardex[0].quantity, 10.0);
    assert_eq!(kardex[1].resulting_avg_cost, 3.0);

    db.inventory().assert_consistency(&product.id).await.unwrap();
}

#[tokio::test]
async fn output_uses_average_cost_and_never_moves_it() {
    let db = test_db().await;
    let product = db
        .catalog()
        .create_product(
            "Arroz",
            "kg",
            Some(InitialStock {
                quantity: 20.0,
                unit_cost: 3.0,
            }),
        )
        .await
        .unwrap();

    let movement = db
        .inventory()
        .register_output(&product.id, MovementKind::Waste, 5.0, source::PHYSICAL_COUNT, "w-1")
        .await
        .unwrap();

    assert_eq!(movement.quantity, -5.0);
    assert_eq!(movement.unit_cost, 3.0);
    assert_eq!(movement.resulting_stock, 15.0);
    assert_eq!(movement.resulting_avg_cost, 3.0);

    let product = db.products().get_by_id(&product.id).await.unwrap();
    assert_eq!(product.stock, 15.0);
    assert_eq!(product.avg_cost, 3.0);
}

#[tokio::test]
async fn insufficient_stock_rejected_and_state_unchanged() {
    let db = test_db().await;
    let product = db
        .catalog()
        .create_product(
            "Cebolla",
            "kg",
            Some(InitialStock {
                quantity: 5.0,
                unit_cost: 2.0,
            }),
        )
        .await
        .unwrap();

    let err = db
        .inventory()
        .register_output(&product.id, MovementKind::Sale, 10.0, source::ORDER, "o-1")
        .await
        .unwrap_err();
    let core = domain_err(err);
    assert!(
        matches!(core, CoreError::InsufficientStock { ref product, .. } if product == "Cebolla")
    );

    // Nothing changed: same snapshot, same single opening movement
    let product = db.products().get_by_id(&product.id).await.unwrap();
    assert_eq!(product.stock, 5.0);
    assert_eq!(db.products().kardex(&product.id).await.unwrap().len(), 1);
    db.inventory().assert_consistency(&product.id).await.unwrap();
}

#[tokio::test]
async fn positive_adjustment_keeps_average_cost() {
    let db = test_db().await;
    let product = db
        .catalog()
        .create_product(
            "Aceite",
            "lt",
            Some(InitialStock {
                quantity: 10.0,
                unit_cost: 40.0,
            }),
        )
        .await
        .unwrap();

    let movement = db
        .inventory()
        .register_positive_adjustment(&product.id, 2.0, source::PHYSICAL_COUNT, "c-1")
        .await
        .unwrap();

    assert_eq!(movement.resulting_stock, 12.0);
    // Found stock is not a purchase: the average stays where it was
    assert_eq!(movement.resulting_avg_cost, 40.0);
    assert_eq!(movement.unit_cost, 40.0);
}

#[tokio::test]
async fn initial_stock_enters_through_the_ledger() {
    let db = test_db().await;
    let product = db
        .catalog()
        .create_product(
            "Pollo",
            "kg",
            Some(InitialStock {
                quantity: 8.0,
                unit_cost: 78.0,
            }),
        )
        .await
        .unwrap();

    assert_eq!(product.stock, 8.0);
    assert_eq!(product.avg_cost, 78.0);

    let kardex = db.products().kardex(&product.id).await.unwrap();
    assert_eq!(kardex.len(), 1);
    assert_eq!(kardex[0].kind, MovementKind::Purchase);
    assert_eq!(kardex[0].source_type, source::PRODUCT_INITIAL);
}

#[tokio::test]
async fn unit_aliases_are_normalized() {
    let db = test_db().await;

    let product = db.catalog().create_product("Leche", "litros", None).await.unwrap();
    assert_eq!(product.unit, fonda_core::UnitOfMeasure::Lt);

    let err = db.catalog().create_product("Piedra", "stone", None).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::Validation(_)));
}

// =============================================================================
// Purchases as documents
// =============================================================================

#[tokio::test]
async fn purchase_document_feeds_ledger_atomically() {
    let db = test_db().await;
    let tomato = db.catalog().create_product("Tomate", "kg", None).await.unwrap();
    let onion = db.catalog().create_product("Cebolla", "kg", None).await.unwrap();

    let purchase = db
        .purchase_service()
        .create_purchase(
            "Mercado Central",
            Utc::now(),
            &[
                PurchaseLineInput {
                    product_id: tomato.id.clone(),
                    quantity: 4.0,
                    unit_cost: 25.0,
                },
                PurchaseLineInput {
                    product_id: onion.id.clone(),
                    quantity: 3.0,
                    unit_cost: 18.0,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(purchase.total, 4.0 * 25.0 + 3.0 * 18.0);

    let tomato = db.products().get_by_id(&tomato.id).await.unwrap();
    assert_eq!(tomato.stock, 4.0);
    assert_eq!(tomato.avg_cost, 25.0);

    let lines = db.purchases().lines(&purchase.id).await.unwrap();
    assert_eq!(lines.len(), 2);

    let listed = db.purchases().list_by_supplier("Mercado Central").await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn bad_purchase_line_rolls_back_everything() {
    let db = test_db().await;
    let tomato = db.catalog().create_product("Tomate", "kg", None).await.unwrap();

    let err = db
        .purchase_service()
        .create_purchase(
            "Proveedor X",
            Utc::now(),
            &[
                PurchaseLineInput {
                    product_id: tomato.id.clone(),
                    quantity: 4.0,
                    unit_cost: 25.0,
                },
                PurchaseLineInput {
                    product_id: "missing-product".to_string(),
                    quantity: 1.0,
                    unit_cost: 1.0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::NotFound { .. }));

    // First line's ledger write must be gone too
    let tomato = db.products().get_by_id(&tomato.id).await.unwrap();
    assert_eq!(tomato.stock, 0.0);
    assert!(db.purchases().list().await.unwrap().is_empty());
}

// =============================================================================
// Orders and tables
// =============================================================================

struct Fixture {
    staff_id: String,
    table_id: String,
    product_id: String,
    dish_id: String,
}

/// One product (stock 10 @ 1.0), one dish consuming 1.0 per unit, one free
/// table, one admin.
async fn fixture(db: &Database) -> Fixture {
    let staff = db.staff().create("admin", Role::Admin).await.unwrap();
    let table = db.catalog().create_table(1).await.unwrap();
    let product = db
        .catalog()
        .create_product(
            "Queso",
            "kg",
            Some(InitialStock {
                quantity: 10.0,
                unit_cost: 1.0,
            }),
        )
        .await
        .unwrap();
    let dish = db
        .catalog()
        .create_dish("Quesadilla", 50.0, &[(product.id.clone(), 1.0)])
        .await
        .unwrap();

    Fixture {
        staff_id: staff.id,
        table_id: table.id,
        product_id: product.id,
        dish_id: dish.id,
    }
}

#[tokio::test]
async fn order_lifecycle_and_table_occupancy() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(
        db.tables().get_by_id(&fx.table_id).await.unwrap().state,
        TableState::Occupied
    );

    // Occupied table rejects a second order
    let err = db
        .order_service()
        .create_order(&fx.table_id, &fx.staff_id)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::TableOccupied { number: 1 }));

    // Manually freeing the table is blocked while the order is active
    let err = db.catalog().free_table(&fx.table_id).await.unwrap_err();
    assert!(matches!(
        domain_err(err),
        CoreError::TableHasActiveOrder { number: 1 }
    ));

    // Cancelling frees the table
    db.order_service()
        .transition(&order.id, OrderStatus::Cancelled, Role::Waiter)
        .await
        .unwrap();
    db.catalog().free_table(&fx.table_id).await.unwrap(); // now a no-op
    assert_eq!(
        db.tables().get_by_id(&fx.table_id).await.unwrap().state,
        TableState::Free
    );

    // Terminal orders reject further transitions
    let err = db
        .order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::OrderFinalized { .. }));
}

#[tokio::test]
async fn order_lines_freeze_price_and_track_total() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    let line = db.order_service().add_line(&order.id, &fx.dish_id, 2.0).await.unwrap();
    assert_eq!(line.unit_price, 50.0);
    assert_eq!(line.subtotal, 100.0);

    // Raising the dish price later must not touch the frozen line
    db.catalog().set_dish_price(&fx.dish_id, 60.0).await.unwrap();
    let lines = db.orders().lines(&order.id).await.unwrap();
    assert_eq!(lines[0].unit_price, 50.0);

    let updated = db.order_service().update_line(&order.id, &line.id, 3.0).await.unwrap();
    assert_eq!(updated.subtotal, 150.0);
    assert_eq!(db.orders().get_by_id(&order.id).await.unwrap().total, 150.0);

    db.order_service().remove_line(&order.id, &line.id).await.unwrap();
    assert_eq!(db.orders().get_by_id(&order.id).await.unwrap().total, 0.0);
}

#[tokio::test]
async fn line_mutation_is_open_only() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    let line = db.order_service().add_line(&order.id, &fx.dish_id, 1.0).await.unwrap();

    db.order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Waiter)
        .await
        .unwrap();

    // Once the ticket is sent, the lines are fixed
    let err = db.order_service().add_line(&order.id, &fx.dish_id, 1.0).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::OrderFinalized { .. }));

    let err = db
        .order_service()
        .update_line(&order.id, &line.id, 5.0)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::OrderFinalized { .. }));

    let err = db.order_service().remove_line(&order.id, &line.id).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::OrderFinalized { .. }));
}

#[tokio::test]
async fn role_narrowing_enforced_on_transitions() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();

    // Kitchen cannot send to preparation
    let err = db
        .order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Kitchen)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::RoleNotAllowed { .. }));

    // Paid is never a direct target
    let err = db
        .order_service()
        .transition(&order.id, OrderStatus::Paid, Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::InvalidTransition { .. }));
}

// =============================================================================
// Payments
// =============================================================================

/// Drives an order to Served with one line of `quantity` dishes.
async fn served_order(db: &Database, fx: &Fixture, quantity: f64) -> String {
    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    db.order_service().add_line(&order.id, &fx.dish_id, quantity).await.unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Waiter)
        .await
        .unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Served, Role::Kitchen)
        .await
        .unwrap();
    order.id
}

#[tokio::test]
async fn payment_consumes_recipe_and_frees_table() {
    let db = test_db().await;
    let fx = fixture(&db).await;
    let order_id = served_order(&db, &fx, 2.0).await;

    db.cash_service().open_session(&fx.staff_id, 500.0).await.unwrap();
    let payment = db
        .cash_service()
        .register_payment(&order_id, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(payment.amount, 100.0);

    // 2 dishes × 1.0 kg each: stock 10 → 8, via a single Sale movement
    let product = db.products().get_by_id(&fx.product_id).await.unwrap();
    assert_eq!(product.stock, 8.0);

    let consumed = db
        .products()
        .movements_for_source(source::ORDER, &order_id)
        .await
        .unwrap();
    assert_eq!(consumed.len(), 1);
    assert_eq!(consumed[0].kind, MovementKind::Sale);
    assert_eq!(consumed[0].quantity, -2.0);

    assert_eq!(
        db.orders().get_by_id(&order_id).await.unwrap().status,
        OrderStatus::Paid
    );
    assert_eq!(
        db.tables().get_by_id(&fx.table_id).await.unwrap().state,
        TableState::Free
    );
    db.inventory().assert_consistency(&fx.product_id).await.unwrap();
}

#[tokio::test]
async fn payment_requires_open_session_and_served_order() {
    let db = test_db().await;
    let fx = fixture(&db).await;
    let order_id = served_order(&db, &fx, 1.0).await;

    // No session open yet
    let err = db
        .cash_service()
        .register_payment(&order_id, PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::NoOpenSession));

    db.cash_service().open_session(&fx.staff_id, 0.0).await.unwrap();

    // A second, still-Open order cannot be paid
    let table2 = db.catalog().create_table(2).await.unwrap();
    let open_order = db.order_service().create_order(&table2.id, &fx.staff_id).await.unwrap();
    let err = db
        .cash_service()
        .register_payment(&open_order.id, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(
        domain_err(err),
        CoreError::OrderNotServed {
            status: OrderStatus::Open,
            ..
        }
    ));
}

#[tokio::test]
async fn empty_order_cannot_be_paid() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    // Served order with no lines at all
    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Waiter)
        .await
        .unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Served, Role::Kitchen)
        .await
        .unwrap();

    db.cash_service().open_session(&fx.staff_id, 0.0).await.unwrap();

    let err = db
        .cash_service()
        .register_payment(&order.id, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::EmptyOrder { .. }));

    // Nothing settled: no payment row, order still Served, table still taken
    let payment = db.cash_sessions().payment_for_order(&order.id).await.unwrap();
    assert!(payment.is_none());

    let reloaded = db.orders().get_by_id(&order.id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Served);

    let table = db.tables().get_by_id(&fx.table_id).await.unwrap();
    assert_eq!(table.state, TableState::Occupied);
}

#[tokio::test]
async fn duplicate_payment_rejected_without_double_consumption() {
    let db = test_db().await;
    let fx = fixture(&db).await;
    let order_id = served_order(&db, &fx, 2.0).await;

    db.cash_service().open_session(&fx.staff_id, 0.0).await.unwrap();
    db.cash_service()
        .register_payment(&order_id, PaymentMethod::Cash)
        .await
        .unwrap();

    let err = db
        .cash_service()
        .register_payment(&order_id, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::DuplicatePayment { .. }));

    // Stock consumed exactly once
    let product = db.products().get_by_id(&fx.product_id).await.unwrap();
    assert_eq!(product.stock, 8.0);
}

#[tokio::test]
async fn missing_recipe_aborts_the_whole_payment() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    // A dish with no recipe on the same order
    let bare_dish = db.catalog().create_dish("Especial", 80.0, &[]).await.unwrap();
    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    db.order_service().add_line(&order.id, &fx.dish_id, 1.0).await.unwrap();
    db.order_service().add_line(&order.id, &bare_dish.id, 1.0).await.unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Preparation, Role::Waiter)
        .await
        .unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Served, Role::Kitchen)
        .await
        .unwrap();

    db.cash_service().open_session(&fx.staff_id, 0.0).await.unwrap();
    let err = db
        .cash_service()
        .register_payment(&order.id, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::MissingRecipe { .. }));

    // Full rollback: no consumption, order still Served, table still taken
    assert_eq!(db.products().get_by_id(&fx.product_id).await.unwrap().stock, 10.0);
    assert_eq!(
        db.orders().get_by_id(&order.id).await.unwrap().status,
        OrderStatus::Served
    );
    assert_eq!(
        db.tables().get_by_id(&fx.table_id).await.unwrap().state,
        TableState::Occupied
    );
    assert!(db
        .cash_sessions()
        .payment_for_order(&order.id)
        .await
        .unwrap()
        .is_none());
}

// =============================================================================
// Physical counts
// =============================================================================

#[tokio::test]
async fn count_apply_adjusts_and_is_one_way() {
    let db = test_db().await;
    let over = db
        .catalog()
        .create_product(
            "Arroz",
            "kg",
            Some(InitialStock {
                quantity: 10.0,
                unit_cost: 20.0,
            }),
        )
        .await
        .unwrap();
    let short = db
        .catalog()
        .create_product(
            "Frijol",
            "kg",
            Some(InitialStock {
                quantity: 10.0,
                unit_cost: 30.0,
            }),
        )
        .await
        .unwrap();

    let (count, lines) = db
        .count_service()
        .create_draft(
            fonda_core::CountType::Monthly,
            Utc::now(),
            &[
                CountLineInput {
                    product_id: over.id.clone(),
                    counted_qty: 12.0,
                },
                CountLineInput {
                    product_id: short.id.clone(),
                    counted_qty: 7.0,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(lines[0].system_qty, 10.0);
    assert_eq!(lines[0].difference, 2.0);
    assert_eq!(lines[1].difference, -3.0);

    db.count_service().apply(&count.id).await.unwrap();

    let over = db.products().get_by_id(&over.id).await.unwrap();
    assert_eq!(over.stock, 12.0);
    assert_eq!(over.avg_cost, 20.0); // overage does not reprice

    let short = db.products().get_by_id(&short.id).await.unwrap();
    assert_eq!(short.stock, 7.0);

    let over_moves = db
        .products()
        .movements_for_source(source::PHYSICAL_COUNT, &count.id)
        .await
        .unwrap();
    assert_eq!(over_moves.len(), 2);
    assert_eq!(over_moves[0].kind, MovementKind::PositiveAdjustment);
    assert_eq!(over_moves[1].kind, MovementKind::NegativeAdjustment);
    assert_eq!(over_moves[1].quantity, -3.0);

    // One-way: applying again is rejected and nothing moves
    let err = db.count_service().apply(&count.id).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::CountAlreadyApplied { .. }));
    assert_eq!(db.products().get_by_id(&over.id).await.unwrap().stock, 12.0);
}

#[tokio::test]
async fn count_draft_requires_lines_and_known_products() {
    let db = test_db().await;

    let err = db
        .count_service()
        .create_draft(fonda_core::CountType::Initial, Utc::now(), &[])
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::Validation(_)));

    let err = db
        .count_service()
        .create_draft(
            fonda_core::CountType::Initial,
            Utc::now(),
            &[CountLineInput {
                product_id: "nope".to_string(),
                counted_qty: 1.0,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(domain_err(err), CoreError::NotFound { .. }));
}

// =============================================================================
// Cash sessions
// =============================================================================

#[tokio::test]
async fn single_open_session_enforced() {
    let db = test_db().await;
    let staff = db.staff().create("caja1", Role::Cashier).await.unwrap();

    let session = db.cash_service().open_session(&staff.id, 300.0).await.unwrap();

    let err = db.cash_service().open_session(&staff.id, 100.0).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::SessionAlreadyOpen));

    let report = db.cash_service().session_status().await.unwrap().unwrap();
    assert_eq!(report.session.id, session.id);
    assert_eq!(report.totals.total, 0.0);
}

#[tokio::test]
async fn close_blocked_by_unsettled_orders_then_summarizes() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let session = db.cash_service().open_session(&fx.staff_id, 500.0).await.unwrap();

    let order_id = served_order(&db, &fx, 2.0).await; // total 100
    let err = db.cash_service().close_session(&session.id).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::UnsettledOrders { pending: 1 }));

    db.cash_service()
        .register_payment(&order_id, PaymentMethod::Cash)
        .await
        .unwrap();

    // Second order paid by card
    let table2 = db.catalog().create_table(2).await.unwrap();
    let order2 = db.order_service().create_order(&table2.id, &fx.staff_id).await.unwrap();
    db.order_service().add_line(&order2.id, &fx.dish_id, 1.0).await.unwrap();
    db.order_service()
        .transition(&order2.id, OrderStatus::Preparation, Role::Waiter)
        .await
        .unwrap();
    db.order_service()
        .transition(&order2.id, OrderStatus::Served, Role::Kitchen)
        .await
        .unwrap();
    db.cash_service()
        .register_payment(&order2.id, PaymentMethod::Card)
        .await
        .unwrap();

    let summary = db.cash_service().close_session(&session.id).await.unwrap();
    assert_eq!(summary.total_cash, 100.0);
    assert_eq!(summary.total_card, 50.0);
    assert_eq!(summary.total_transfer, 0.0);
    assert_eq!(summary.total_sales, 150.0);

    // Closed is closed
    let err = db.cash_service().close_session(&session.id).await.unwrap_err();
    assert!(matches!(domain_err(err), CoreError::SessionClosed { .. }));

    // And no payments without a session afterwards
    assert!(db.cash_service().session_status().await.unwrap().is_none());

    let stored = db.cash_sessions().closing_summary(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.total_sales, 150.0);
}

#[tokio::test]
async fn cancelled_orders_do_not_block_close() {
    let db = test_db().await;
    let fx = fixture(&db).await;

    let session = db.cash_service().open_session(&fx.staff_id, 0.0).await.unwrap();

    let order = db.order_service().create_order(&fx.table_id, &fx.staff_id).await.unwrap();
    db.order_service()
        .transition(&order.id, OrderStatus::Cancelled, Role::Waiter)
        .await
        .unwrap();

    let summary = db.cash_service().close_session(&session.id).await.unwrap();
    assert_eq!(summary.total_sales, 0.0);
}
