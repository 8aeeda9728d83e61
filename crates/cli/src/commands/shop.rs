//! Catalogue, cart, and checkout commands.
//!
//! # Usage
//!
//! ```bash
//! techmart products category Laptops
//! techmart cart add 5 --quantity 2
//! techmart cart dec 17
//! techmart checkout --street "12 MG Road" --state Karnataka --zip 560001
//! ```

use clap::{Args, Subcommand};
use serde::Serialize;

use techmart_client::{AddOutcome, AppContext};
use techmart_core::{CartItemId, CartLine, PaymentMethod, Price, ProductId, ShippingDetails};

use super::{CommandError, print_json};

#[derive(Subcommand)]
pub enum ProductsAction {
    /// Every product
    List,
    /// One product
    Show { id: ProductId },
    /// Products in a category
    Category { name: String },
    /// Full-text search
    Search { query: String },
    /// Featured products
    Featured,
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Lines and totals
    Show,
    /// Add a product; saved until login when signed out
    Add {
        product_id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Increase a line's quantity by one
    Inc { item_id: CartItemId },
    /// Decrease a line's quantity by one, removing it at zero
    Dec { item_id: CartItemId },
    /// Remove a line
    Remove { item_id: CartItemId },
}

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    street: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zip: String,

    #[arg(long, default_value = "India")]
    country: String,

    /// `cod`, `upi`, or `bank`
    #[arg(long, default_value = "cod")]
    payment: PaymentMethod,
}

#[derive(Serialize)]
struct CartView<'a> {
    lines: &'a [CartLine],
    quantity: u32,
    subtotal: Price,
    tax: Price,
    total: Price,
}

fn print_cart(context: &AppContext) -> Result<(), CommandError> {
    let totals = context.cart_totals();
    print_json(&CartView {
        lines: context.cart(),
        quantity: totals.quantity,
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
    })
}

/// Run a `products` subcommand.
///
/// # Errors
///
/// Returns error if the fetch fails.
pub async fn products(context: &AppContext, action: ProductsAction) -> Result<(), CommandError> {
    let api = context.api();
    match action {
        ProductsAction::List => print_json(&api.products().await?),
        ProductsAction::Show { id } => print_json(&api.product(id).await?),
        ProductsAction::Category { name } => print_json(&api.products_by_category(&name).await?),
        ProductsAction::Search { query } => print_json(&api.search_products(&query).await?),
        ProductsAction::Featured => print_json(&api.featured_products().await?),
    }
}

/// Run a `cart` subcommand and print the resulting cart.
///
/// # Errors
///
/// Returns error if the product lookup or the mutation fails.
pub async fn cart(context: &mut AppContext, action: CartAction) -> Result<(), CommandError> {
    match action {
        CartAction::Show => {}
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product = context.api().product(product_id).await?;
            if context.add_to_cart(&product, quantity).await? == AddOutcome::Deferred {
                tracing::info!(product_id = %product.id, "Item will be added at next login");
            }
        }
        CartAction::Inc { item_id } => context.update_quantity(item_id, 1).await?,
        CartAction::Dec { item_id } => context.update_quantity(item_id, -1).await?,
        CartAction::Remove { item_id } => context.remove_item(item_id).await?,
    }
    print_cart(context)
}

/// Place an order for the current cart.
///
/// # Errors
///
/// Returns error when signed out, on an incomplete form or empty cart, or if
/// the backend refuses the order.
pub async fn checkout(context: &mut AppContext, args: CheckoutArgs) -> Result<(), CommandError> {
    let shipping = ShippingDetails {
        street: args.street,
        state: args.state,
        zip_code: args.zip,
        country: args.country,
    };
    context.place_order(&shipping, args.payment).await?;
    Ok(())
}
