//! Order history, returns, and review commands.
//!
//! # Usage
//!
//! ```bash
//! techmart orders list --filter active
//! techmart orders return 41 damaged --details "Cracked screen"
//! techmart reviews add 5 4 "Great sound, average battery"
//! ```

use clap::Subcommand;
use serde::Serialize;

use techmart_client::AppContext;
use techmart_core::{
    Order, OrderFilter, OrderId, ProductId, RatingSummary, ReturnReason, ReturnRequest, Review,
    ReviewId, user_has_reviewed,
};

use super::{CommandError, print_json};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// Your orders
    List {
        /// `all`, `active`, or `refunded`
        #[arg(long, default_value = "all")]
        filter: OrderFilter,
    },
    /// One order
    Show { id: OrderId },
    /// Cancel an order that has not been delivered
    Cancel { id: OrderId, reason: String },
    /// Ask to return a delivered order
    Return {
        id: OrderId,

        /// `wrong-item`, `damaged`, `not-working`, `change-of-mind`, or `other`
        reason: Option<ReturnReason>,

        #[arg(long, default_value = "")]
        details: String,
    },
}

#[derive(Subcommand)]
pub enum ReviewsAction {
    /// A product's reviews with their rating summary
    List { product_id: ProductId },
    /// Reviews you wrote
    Mine,
    /// Review a product
    Add {
        product_id: ProductId,
        /// 1 to 5 stars
        rating: u8,
        comment: String,
    },
    /// Replace a review's comment
    Edit { id: ReviewId, comment: String },
    /// Delete one of your reviews
    Delete { id: ReviewId },
}

#[derive(Serialize)]
struct ReviewsView<'a> {
    average: f64,
    total: usize,
    /// Percentage of reviews per star, one star first.
    distribution: [f64; 5],
    #[serde(skip_serializing_if = "Option::is_none")]
    reviewed_by_you: Option<bool>,
    reviews: &'a [Review],
}

/// Run an `orders` subcommand.
///
/// # Errors
///
/// Returns error when signed out, on a missing reason, or if the backend
/// refuses.
pub async fn orders(context: &mut AppContext, action: OrdersAction) -> Result<(), CommandError> {
    match action {
        OrdersAction::List { filter } => {
            let orders: Vec<Order> = context
                .orders()
                .await?
                .into_iter()
                .filter(|order| filter.matches(order))
                .collect();
            print_json(&orders)
        }
        OrdersAction::Show { id } => print_json(&context.api().order(id).await?),
        OrdersAction::Cancel { id, reason } => Ok(context.cancel_order(id, &reason).await?),
        OrdersAction::Return {
            id,
            reason,
            details,
        } => {
            let request = match ReturnRequest::new(reason, &details) {
                Ok(request) => request,
                Err(e) => {
                    context.api().notifier().alert(&e.to_string());
                    return Err(e.into());
                }
            };
            Ok(context.request_return(id, &request).await?)
        }
    }
}

/// Run a `reviews` subcommand.
///
/// # Errors
///
/// Returns error on invalid input, when signed out, or if the backend
/// refuses.
pub async fn reviews(context: &mut AppContext, action: ReviewsAction) -> Result<(), CommandError> {
    match action {
        ReviewsAction::List { product_id } => {
            let reviews = context.api().product_reviews(product_id).await?;
            let summary = RatingSummary::of(&reviews);
            print_json(&ReviewsView {
                average: summary.average,
                total: summary.total,
                distribution: [1, 2, 3, 4, 5].map(|star| summary.percentage(star)),
                reviewed_by_you: context.user().map(|user| user_has_reviewed(&reviews, user)),
                reviews: &reviews,
            })
        }
        ReviewsAction::Mine => print_json(&context.my_reviews().await?),
        ReviewsAction::Add {
            product_id,
            rating,
            comment,
        } => Ok(context.submit_review(product_id, rating, &comment).await?),
        ReviewsAction::Edit { id, comment } => Ok(context.edit_review(id, &comment).await?),
        ReviewsAction::Delete { id } => Ok(context.delete_review(id).await?),
    }
}
