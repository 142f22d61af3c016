//! bitebook - command-line front-end for the food-ordering backend.
//!
//! Every invocation runs under one role context (`user`, `restaurant` or
//! `admin`) and drives the shared session manager: the credential written by
//! `login` is reused by later invocations until `logout` or an expired token
//! clears it.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitebook_core::api::ApiClient;
use bitebook_core::auth::login_redirect;
use bitebook_core::models::{
    AdminRegistration, FormPayload, LoginRequest, MenuItemStatus, NewOrder, PaymentMethod,
    RestaurantRegistration, UserRegistration,
};
use bitebook_core::nav::{HistoryNavigator, Navigator};
use bitebook_core::notify::ConsoleNotifier;
use bitebook_core::{Config, CredentialStore, GuardDecision, Role, RouteGuard, SessionManager};

const USAGE: &str = "\
Usage: bitebook <role> <command> [args] [--path <location>]

Roles: user, restaurant, admin

Commands:
  login [email]                       Log in (password is prompted)
  register <name> <email>             Create an account (password is prompted)
  logout                              Log out and clear the stored credential
  whoami                              Restore and show the current identity
  guard <path>                        Evaluate the route guard for a path
  profile <field=value>...            Update profile fields
  toggle-status                       Open or close the restaurant
  menu                                List menu items
  orders                              List orders
  order <menu-item-id> <qty> [card|cod]
                                      Place a direct order
  pending                             List restaurants awaiting approval
  approve <id>...                     Approve restaurants
  reject <id>...                      Reject restaurants
  health                              Check backend availability

Options:
  --path <location>   Starting location for navigation (default: /)

Environment:
  BITEBOOK_API_BASE   Backend base URL
  RUST_LOG            Log filter (default: warn)";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

struct Invocation {
    role: Role,
    command: String,
    args: Vec<String>,
    path: String,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Option<Invocation>> {
    let mut path = "/".to_string();
    let mut positional = Vec::new();

    let mut raw = raw.into_iter();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--path" => {
                path = raw.next().context("--path needs a value")?;
            }
            other => match other.strip_prefix("--path=") {
                Some(value) => path = value.to_string(),
                None => positional.push(arg),
            },
        }
    }

    let mut positional = positional.into_iter();
    let (Some(role), Some(command)) = (positional.next(), positional.next()) else {
        return Ok(None);
    };

    Ok(Some(Invocation {
        role: role.parse()?,
        command,
        args: positional.collect(),
        path,
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let invocation = match parse_args(std::env::args().skip(1)) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            eprintln!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {:#}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(invocation).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs, wired once per invocation.
struct Cli {
    config: Config,
    store: Arc<dyn CredentialStore>,
    navigator: HistoryNavigator,
    manager: SessionManager,
}

/// Run one command. `Ok(false)` means the failure was already reported to
/// the user through the notifier.
async fn run(invocation: Invocation) -> Result<bool> {
    let config = Config::load()?;
    let store = config.credential_store()?;
    let api = ApiClient::new(config.api_base(), store.clone())?;
    let navigator = HistoryNavigator::new(invocation.path.clone());
    let manager = SessionManager::new(
        invocation.role,
        &api,
        store.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(navigator.clone()),
    );
    info!(role = %invocation.role, command = %invocation.command, base = %api.base_url(), "bitebook starting");

    let mut ctx = Cli {
        config,
        store,
        navigator,
        manager,
    };
    let args = invocation.args;

    let ok = match invocation.command.as_str() {
        "login" => login(&mut ctx, args.first().cloned()).await?,
        "register" => register(&ctx, &args).await?,
        "logout" => {
            ctx.manager.logout().await;
            true
        }
        "whoami" => whoami(&ctx).await,
        "guard" => guard(&ctx, args.first().map(String::as_str)).await?,
        "profile" => update_profile(&ctx, &args).await?,
        "toggle-status" => toggle_status(&ctx).await,
        "menu" => menu(&ctx).await?,
        "orders" => orders(&ctx).await?,
        "order" => place_order(&ctx, &args).await?,
        "pending" => pending(&ctx).await?,
        "approve" => review(&ctx, &args, true).await?,
        "reject" => review(&ctx, &args, false).await?,
        "health" => {
            ctx.manager.api().health().await?;
            eprintln!("✓ Backend is up ({})", ctx.manager.api().base_url());
            true
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    };

    report_navigation(&ctx.navigator, &invocation.path);
    Ok(ok)
}

/// Show where the session manager sent the user, if anywhere.
fn report_navigation(navigator: &HistoryNavigator, start: &str) {
    let current = navigator.current_path();
    if current != start {
        eprintln!("→ {}", current);
    }
}

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ============================================================================
// Auth commands
// ============================================================================

async fn login(ctx: &mut Cli, email: Option<String>) -> Result<bool> {
    let role = ctx.manager.role();
    if let Some(dashboard) = login_redirect(ctx.store.as_ref(), role) {
        eprintln!("Already logged in as {}. Use `logout` first.", role);
        ctx.navigator.navigate(&dashboard, true);
        return Ok(true);
    }

    let email = match email {
        Some(email) => email,
        None => match ctx.config.last_email.clone().filter(|_| ctx.config.last_role == Some(role)) {
            Some(last) => {
                let entered = prompt_line(&format!("Email [{}]: ", last))?;
                if entered.is_empty() { last } else { entered }
            }
            None => prompt_line("Email: ")?,
        },
    };
    let password = rpassword::prompt_password("Password: ")?;

    match ctx.manager.login(&LoginRequest::new(email.clone(), password)).await {
        Ok(identity) => {
            let name = identity.as_ref().map(|i| i.display_name()).unwrap_or(email.as_str());
            eprintln!("Welcome, {}!", name);
            ctx.config.last_role = Some(role);
            ctx.config.last_email = Some(email);
            ctx.config.save()?;
            ctx.navigator.navigate(&role.dashboard_path(), true);
            Ok(true)
        }
        Err(e) => {
            debug!(error = %e, "Login command failed");
            Ok(false)
        }
    }
}

async fn register(ctx: &Cli, args: &[String]) -> Result<bool> {
    let [name, email] = args else {
        bail!("Usage: bitebook <role> register <name> <email>");
    };
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        eprintln!("✗ Passwords do not match");
        return Ok(false);
    }

    let (name, email) = (name.clone(), email.clone());
    let payload = match ctx.manager.role() {
        Role::User => FormPayload::from_serialize(&UserRegistration {
            name,
            email,
            password,
            phone: None,
        }),
        Role::Restaurant => FormPayload::from_serialize(&RestaurantRegistration {
            name,
            email,
            password,
            phone: None,
            address: None,
            description: None,
        }),
        Role::Admin => FormPayload::from_serialize(&AdminRegistration { name, email, password }),
    }?;

    ctx.manager.register(&payload).await;
    Ok(true)
}

async fn whoami(ctx: &Cli) -> bool {
    match ctx.manager.restore().await {
        Some(identity) => {
            println!("{} ({})", identity.display_name(), ctx.manager.role().display_name());
            if let Some(ref email) = identity.email {
                println!("  email:  {}", email);
            }
            if let Some(is_active) = identity.is_active {
                println!("  status: {}", if is_active { "open" } else { "closed" });
            }
            if ctx.manager.has_foreign_identity() {
                println!("  note:   credential belongs to the {} role", identity.role.as_deref().unwrap_or("?"));
            }
            true
        }
        None => {
            eprintln!("Not logged in as {}", ctx.manager.role());
            false
        }
    }
}

async fn guard(ctx: &Cli, path: Option<&str>) -> Result<bool> {
    let path = path.context("Usage: bitebook <role> guard <path>")?;
    ctx.navigator.navigate(path, false);

    let decision = RouteGuard::new(ctx.manager.role()).check(&ctx.manager).await;
    match &decision {
        GuardDecision::Authorized(identity) => {
            println!("authorized: {} may view {}", identity.display_name(), path);
        }
        GuardDecision::Checking => println!("checking"),
        GuardDecision::Unauthenticated { redirect } => println!("unauthenticated: redirect to {}", redirect),
        GuardDecision::RoleMismatch { redirect } => println!("wrong role: redirect to {}", redirect),
    }
    if let Some(redirect) = decision.redirect() {
        ctx.navigator.navigate(redirect, true);
    }
    Ok(decision.is_authorized())
}

async fn update_profile(ctx: &Cli, args: &[String]) -> Result<bool> {
    if args.is_empty() {
        bail!("Usage: bitebook <role> profile <field=value>...");
    }
    let mut payload = FormPayload::default();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("Expected field=value, got {}", arg))?;
        payload = payload.field(key.trim(), value.trim());
    }

    Ok(match ctx.manager.update_profile(&payload).await {
        Ok(identity) => {
            if let Some(identity) = identity {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            }
            true
        }
        Err(_) => false,
    })
}

async fn toggle_status(ctx: &Cli) -> bool {
    ctx.manager.restore().await;
    match ctx.manager.toggle_status().await {
        Ok(Some(true)) => {
            eprintln!("✓ Restaurant is now open");
            true
        }
        Ok(Some(false)) => {
            eprintln!("✓ Restaurant is now closed");
            true
        }
        Ok(None) => {
            eprintln!("toggle-status only applies to the restaurant role");
            false
        }
        Err(_) => false,
    }
}

// ============================================================================
// Data commands
// ============================================================================

async fn menu(ctx: &Cli) -> Result<bool> {
    // A restaurant sees its own menu; everyone else browses the public one.
    let restaurant_id = match ctx.manager.role() {
        Role::Restaurant => ctx.manager.restore().await.and_then(|identity| identity.id),
        _ => None,
    };
    let items = ctx.manager.api().fetch_menu_items(restaurant_id.as_deref()).await?;

    if items.is_empty() {
        eprintln!("No menu items");
    }
    for item in items {
        let marker = match item.status_kind() {
            MenuItemStatus::Available => "",
            MenuItemStatus::Unavailable => " (unavailable)",
        };
        println!(
            "{:<26} {:<28} {:>9}{}",
            item.id,
            item.name,
            item.display_price(),
            marker
        );
    }
    Ok(true)
}

async fn orders(ctx: &Cli) -> Result<bool> {
    let (identity, orders) =
        futures::future::join(ctx.manager.restore(), ctx.manager.api().fetch_orders()).await;
    let orders = orders?;

    if let Some(identity) = identity {
        eprintln!("Orders for {}", identity.display_name());
    }
    if orders.is_empty() {
        eprintln!("No orders");
    }
    for order in orders {
        let placed = order
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:<26} {:<16} {}", order.id, placed, order.summary());
    }
    Ok(true)
}

async fn place_order(ctx: &Cli, args: &[String]) -> Result<bool> {
    let (item_id, quantity, payment) = match args {
        [id, qty] => (id, qty, None),
        [id, qty, payment] => (id, qty, Some(payment.as_str())),
        _ => bail!("Usage: bitebook user order <menu-item-id> <qty> [card|cod]"),
    };
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("Invalid quantity: {}", quantity))?;

    let (identity, item) =
        futures::future::join(ctx.manager.restore(), ctx.manager.api().fetch_menu_item(item_id)).await;
    let Some(identity) = identity else {
        eprintln!("✗ Please login to place an order");
        return Ok(false);
    };
    let item = item?;

    let order = NewOrder::direct(identity.id, &item, quantity, PaymentMethod::from_str(payment))?;
    let total = order.total_price;
    let method = order.payment_method;
    match ctx.manager.api().create_order(&order).await? {
        Some(created) => eprintln!("✓ Order {} placed: {}", created.id, created.summary()),
        None => eprintln!(
            "✓ Order placed: {} x {} (${:.2}, {})",
            quantity,
            item.name,
            total,
            method.display_name()
        ),
    }
    Ok(true)
}

async fn pending(ctx: &Cli) -> Result<bool> {
    let restaurants = ctx.manager.api().fetch_pending_restaurants().await?;
    if restaurants.is_empty() {
        eprintln!("No restaurants awaiting approval");
    }
    for restaurant in restaurants {
        println!(
            "{:<26} {:<28} {}",
            restaurant.id,
            restaurant.name,
            restaurant.email.as_deref().unwrap_or("-")
        );
    }
    Ok(true)
}

/// Approve or reject every id concurrently, reporting each outcome.
async fn review(ctx: &Cli, ids: &[String], approve: bool) -> Result<bool> {
    if ids.is_empty() {
        bail!("Usage: bitebook admin {} <id>...", if approve { "approve" } else { "reject" });
    }
    let api = ctx.manager.api();
    let futures = ids.iter().map(|id| async move {
        let result = if approve {
            api.approve_restaurant(id).await
        } else {
            api.reject_restaurant(id).await
        };
        (id, result)
    });
    let results = futures::future::join_all(futures).await;

    let mut all_ok = true;
    for (id, result) in results {
        match result {
            Ok(()) => eprintln!("✓ {} {}", if approve { "Approved" } else { "Rejected" }, id),
            Err(e) => {
                all_ok = false;
                eprintln!("✗ {}: {}", id, e);
            }
        }
    }
    Ok(all_ok)
}
