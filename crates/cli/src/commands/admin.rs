//! Back-office commands.
//!
//! # Usage
//!
//! ```bash
//! techmart admin dashboard
//! techmart admin product-add --name "Pixel 9" --category Smartphones --brand Google --price 79999 --stock 10 --image pixel.jpg
//! techmart admin status 41 shipped --tracking TRK123
//! techmart admin received 41 good
//! ```
//!
//! Every command needs an admin session (`techmart admin-login`).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use techmart_client::{ADMIN_REQUIRED, AdminRequestError, AppContext, ClientError, ProductImage};
use techmart_core::{
    ItemCondition, OrderFilter, OrderId, OrderStatus, Price, ProductForm, ProductId, StatusUpdate,
    UserSummary, cancellation_reason,
};

use super::{CommandError, print_json};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Store totals
    Dashboard,
    /// Stock per category, or the products of one category
    Stock {
        #[arg(long)]
        category: Option<String>,
    },
    /// Every registered user
    Users,
    /// Every order
    Orders {
        /// `all`, `active`, or `refunded`
        #[arg(long, default_value = "all")]
        filter: OrderFilter,
    },
    /// Confirm an online payment
    ConfirmPayment { id: OrderId },
    /// Move an order to a new status
    Status {
        id: OrderId,

        /// e.g. `processing`, `shipped`, `out-for-delivery`, `delivered`
        status: OrderStatus,

        /// Required when shipping
        #[arg(long)]
        tracking: Option<String>,
    },
    /// Orders with a return in progress
    Returns,
    /// Approve a return request
    Approve { id: OrderId },
    /// Reject a return request
    Reject { id: OrderId, reason: String },
    /// Record that the returned item arrived
    Received {
        id: OrderId,
        /// `good` or `damaged`
        condition: ItemCondition,
    },
    /// Start the refund for a received return
    Refund { id: OrderId },
    /// Mark a refund as paid out
    RefundComplete { id: OrderId },
    /// Create a product
    ProductAdd(ProductArgs),
    /// Replace a product's fields
    ProductUpdate {
        id: ProductId,

        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product
    ProductDelete { id: ProductId },
    /// Set a product's stock level
    SetStock { product_id: ProductId, stock: u32 },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    brand: String,

    #[arg(long)]
    price: Price,

    #[arg(long)]
    stock: u32,

    #[arg(long, default_value_t = ProductForm::DEFAULT_RATING)]
    rating: f64,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

impl ProductArgs {
    async fn into_parts(self) -> Result<(ProductForm, Option<ProductImage>), CommandError> {
        let image = match self.image {
            Some(path) => Some(read_image(path).await?),
            None => None,
        };
        let form = ProductForm {
            name: self.name,
            description: self.description,
            category: self.category,
            brand: self.brand,
            price: self.price,
            stock: self.stock,
            rating: self.rating,
        };
        Ok((form, image))
    }
}

async fn read_image(path: PathBuf) -> Result<ProductImage, CommandError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| CommandError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    Ok(ProductImage { file_name, bytes })
}

/// Run an `admin` subcommand.
///
/// # Errors
///
/// Returns `Forbidden` without an admin session, a validation error for an
/// incomplete form, or the backend's refusal.
pub async fn run(context: &AppContext, action: AdminAction) -> Result<(), CommandError> {
    if !context.is_authenticated() || !context.user().is_some_and(UserSummary::is_admin) {
        return Err(ClientError::Forbidden(ADMIN_REQUIRED.to_string()).into());
    }

    let api = context.api();
    let notifier = api.notifier();
    match action {
        AdminAction::Dashboard => print_json(&api.dashboard().await?),
        AdminAction::Stock { category: None } => print_json(&api.stock_summary().await?),
        AdminAction::Stock {
            category: Some(category),
        } => print_json(&api.stock_by_category(&category).await?),
        AdminAction::Users => print_json(&api.all_users().await?),
        AdminAction::Orders { filter } => {
            let mut orders = api.all_orders().await?;
            orders.retain(|order| filter.matches(order));
            print_json(&orders)
        }
        AdminAction::ConfirmPayment { id } => {
            api.confirm_payment(id).await?;
            notifier.alert("Payment confirmed");
            Ok(())
        }
        AdminAction::Status {
            id,
            status,
            tracking,
        } => {
            let update = StatusUpdate::new(status, tracking.as_deref())?;
            api.update_order_status(id, &update).await?;
            notifier.alert(&format!("Order status updated to {status}"));
            Ok(())
        }
        AdminAction::Returns => print_json(&api.return_requests().await?),
        AdminAction::Approve { id } => {
            api.approve_return(id).await?;
            notifier.alert("Return approved");
            Ok(())
        }
        AdminAction::Reject { id, reason } => {
            let reason = cancellation_reason(&reason)?;
            api.reject_return(id, &reason).await?;
            notifier.alert("Return rejected");
            Ok(())
        }
        AdminAction::Received { id, condition } => {
            api.confirm_return_received(id, condition).await?;
            notifier.alert("Return marked as received");
            Ok(())
        }
        AdminAction::Refund { id } => {
            api.initiate_refund(id).await?;
            notifier.alert("Refund initiated");
            Ok(())
        }
        AdminAction::RefundComplete { id } => {
            api.complete_refund(id).await?;
            notifier.alert("Refund completed");
            Ok(())
        }
        AdminAction::ProductAdd(product) => {
            let (form, image) = product.into_parts().await?;
            alert_outcome(
                context,
                api.add_product(&form, image).await,
                "✅ Product added successfully!",
                "Failed to add product",
            )
        }
        AdminAction::ProductUpdate { id, product } => {
            let (form, image) = product.into_parts().await?;
            alert_outcome(
                context,
                api.update_product(id, &form, image).await,
                "✅ Product updated!",
                "Failed to update product",
            )
        }
        AdminAction::ProductDelete { id } => alert_outcome(
            context,
            api.delete_product(id).await.map_err(AdminRequestError::from),
            "Product deleted",
            "Failed to delete",
        ),
        AdminAction::SetStock { product_id, stock } => alert_outcome(
            context,
            api.set_stock(product_id, stock)
                .await
                .map_err(AdminRequestError::from),
            "Stock updated",
            "Failed to update stock",
        ),
    }
}

fn alert_outcome(
    context: &AppContext,
    result: Result<(), AdminRequestError>,
    success: &str,
    failure: &str,
) -> Result<(), CommandError> {
    let notifier = context.api().notifier();
    match result {
        Ok(()) => {
            notifier.alert(success);
            Ok(())
        }
        Err(AdminRequestError::Validation(e)) => {
            notifier.alert(&e.to_string());
            Err(e.into())
        }
        Err(AdminRequestError::Api(e)) => {
            notifier.alert(e.backend_message().unwrap_or(failure));
            Err(e.into())
        }
    }
}
