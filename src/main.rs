use tracing::{error, info, Instrument};

use coalshop::config::Config;
use coalshop::domain::{
    Cart, DeliveryMethod, PaymentMethod, Product, Promotions, Rank, User,
};
use coalshop::pricing::PointsChoice;
use coalshop::services::CheckoutOptions;
use coalshop::store::paths;
use coalshop::system::{setup_tracing, ShopSystem};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    info!("Starting coalshop");

    let config = Config::load();
    let system = ShopSystem::new(&config);

    if let Some(previous) = system.auth.restore() {
        info!(user_id = %previous.user_id, "Found a persisted session from a previous run");
    }

    seed_shop(&system).await?;

    // A new customer registers and waits for approval.
    let span = tracing::info_span!("registration");
    async {
        info!("Registering test customer");
        system
            .auth
            .register("alice", "alice@example.com", "hunter42", "hunter42")
            .await
    }
    .instrument(span)
    .await?;

    let (admin_session, _) = system.auth.login("manager", "letmein99").await?;
    system.admin.approve_user(&admin_session, "alice").await?;

    let (session, user) = system.auth.login("alice", "hunter42").await?;
    info!(user_id = %user.id, points = user.points, "Customer logged in");

    // Fill a cart from the catalog and check out.
    let mut cart = Cart::new();
    let products = system.catalog.products().await?;
    if let Some(diamond) = products.get("Diamond") {
        cart.add(diamond, 3)?;
    }

    let options = CheckoutOptions {
        delivery: DeliveryMethod::Normal,
        payment: PaymentMethod::Cod,
        branch: "North Station".into(),
        points: PointsChoice::None,
    };

    let span = tracing::info_span!("checkout");
    let placed = async {
        info!("Placing order");
        system.checkout.place_order(&session, &mut cart, &options).await
    }
    .instrument(span)
    .await;

    match placed {
        Ok((order_id, order)) => {
            info!(order_id = %order_id, total = order.total, "Order placed");

            system
                .admin
                .ship_order(&admin_session, &order_id, "North Station")
                .await?;

            let history = system.tracking.my_orders(&session).await?;
            for entry in &history {
                let (percent, label) = entry.progress();
                info!(order_id = %entry.id(), percent, label, "Tracking");
            }
        }
        Err(e) => error!(error = %e, "Checkout failed"),
    }

    system.auth.logout().await?;
    system.shutdown().await?;

    info!("Done");
    Ok(())
}

/// Bootstrap data: one admin account, a small catalog, a branch, and the
/// promotions singleton.
async fn seed_shop(system: &ShopSystem) -> Result<(), Box<dyn std::error::Error>> {
    let mut manager = User::new("manager", "manager@example.com", "letmein99");
    manager.approved = true;
    manager.rank = Rank::Admin;
    system.store.set_from(paths::user("manager"), &manager).await?;

    let diamond = Product {
        id: "Diamond".into(),
        name: "Diamond".into(),
        category: "ore".into(),
        description: "A flawless gem, mined deep below.".into(),
        img: "diamond.png".into(),
        price: 2.0,
        discount_price: None,
        stock: 24,
        kit: None,
    };
    system.store.set_from(paths::product("Diamond"), &diamond).await?;

    let starter_kit = Product {
        id: "StarterKit".into(),
        name: "Starter Kit".into(),
        category: "kit".into(),
        description: "Everything a new arrival needs.".into(),
        img: "starter.png".into(),
        price: 8.0,
        discount_price: Some(6.5),
        stock: 10,
        kit: Some(vec![
            "Stone Sword".into(),
            "Bread x16".into(),
            "Torch x32".into(),
        ]),
    };
    system
        .store
        .set_from(paths::product("StarterKit"), &starter_kit)
        .await?;

    system
        .store
        .set_from(paths::branches(), &vec!["North Station".to_string()])
        .await?;
    system
        .store
        .set_from(paths::promotions(), &Promotions::default())
        .await?;

    info!("Shop seeded");
    Ok(())
}
