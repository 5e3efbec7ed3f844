//! Resource seeding.
//!
//! Creates the category, product, cart item and two orders the suite works
//! on. Seed rows go into the same run log as the test cases.

use storecheck_domain::{CaseOutcome, ResponseSpec};

use crate::error::{ApplicationError, ApplicationResult};
use crate::executor::CaseExecutor;
use crate::ports::ApiSession;
use crate::suite::{
    cart_seed, category_seed, order_seed, product_seed, SeedCase, ORDER_ID, SECOND_ORDER_ID,
};

const EXCERPT_CHARS: usize = 200;

/// Runs the seeds on `executor`, leaving their identifiers captured.
///
/// # Errors
///
/// Returns `ApplicationError::Seed` if a required resource is not created
/// or its identifier is missing from the response.
pub async fn seed_resources<S: ApiSession>(
    executor: &mut CaseExecutor<'_, S>,
) -> ApplicationResult<()> {
    run_seed(executor, category_seed()).await?;
    let product = product_seed(executor.ids());
    run_seed(executor, product).await?;

    let cart = cart_seed(executor.ids())?;
    run_seed(executor, cart).await?;
    let order = order_seed(executor.ids(), ORDER_ID)?;
    run_seed(executor, order).await?;
    let second = order_seed(executor.ids(), SECOND_ORDER_ID)?;
    run_seed(executor, second).await?;

    tracing::info!(captured = executor.ids().len(), "seeding finished");
    Ok(())
}

async fn run_seed<S: ApiSession>(
    executor: &mut CaseExecutor<'_, S>,
    seed: SeedCase,
) -> ApplicationResult<()> {
    let capture = seed.case.capture.as_ref().map(|rule| rule.name.clone());
    let (row, response) = executor.run(&seed.case).await;
    let failure = match &row.outcome {
        CaseOutcome::Passed { .. } => None,
        CaseOutcome::Failed { status, reason } => Some((*status, reason.clone())),
        CaseOutcome::Skipped { reason } => Some((None, reason.clone())),
    };

    let captured = capture.is_none_or(|name| executor.ids().contains(&name));
    let failure = failure.or_else(|| {
        (!captured).then(|| {
            let status = response.as_ref().map(|r| r.status);
            (status, "no identifier in response".to_string())
        })
    });

    let Some((status, reason)) = failure else {
        return Ok(());
    };
    let detail = match response.as_ref() {
        Some(response) => format!("{reason}: {}", excerpt(response)),
        None => reason,
    };
    if seed.required {
        return Err(ApplicationError::Seed {
            resource: seed.resource.to_string(),
            status,
            detail,
        });
    }
    tracing::warn!(resource = seed.resource, ?status, %detail, "optional seed failed, continuing");
    Ok(())
}

fn excerpt(response: &ResponseSpec) -> String {
    let body = response.excerpt(EXCERPT_CHARS);
    if body.is_empty() {
        "<empty body>".to_string()
    } else {
        body
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::executor::Sessions;
    use crate::ports::SessionFactory;
    use crate::suite::{CART_ITEM_ID, CATEGORY_ID, PRODUCT_ID};
    use crate::test_support::{FakeServer, FakeSession, FakeSessionFactory};
    use pretty_assertions::assert_eq;
    use storecheck_domain::{Credentials, HttpMethod, Role};

    async fn logged_in(server: FakeServer) -> Sessions<FakeSession> {
        let admin = Credentials::new(Role::Admin, "admin@vexo.com", "pw", "Alice Admin");
        let customer = Credentials::new(Role::Customer, "joe@vexo.com", "pw", "Joe Customer");
        let factory =
            FakeSessionFactory::new(server.with_account(&admin).with_account(&customer));
        let sessions = Sessions {
            admin: factory.open(Role::Admin).unwrap(),
            customer: factory.open(Role::Customer).unwrap(),
        };
        crate::auth::login(&sessions.admin, &admin).await.unwrap();
        crate::auth::login(&sessions.customer, &customer).await.unwrap();
        sessions
    }

    #[tokio::test]
    async fn test_seeds_capture_all_identifiers() {
        let sessions = logged_in(FakeServer::new()).await;
        let mut executor = CaseExecutor::new(&sessions);

        seed_resources(&mut executor).await.unwrap();

        for name in [CATEGORY_ID, PRODUCT_ID, CART_ITEM_ID, ORDER_ID, SECOND_ORDER_ID] {
            assert!(executor.ids().contains(name), "{name}");
        }
        assert_ne!(executor.ids().get(ORDER_ID), executor.ids().get(SECOND_ORDER_ID));
        assert_eq!(executor.rows().len(), 5);
        assert!(executor.rows().iter().all(|r| r.passed()));
    }

    #[tokio::test]
    async fn test_category_failure_is_tolerated() {
        let server = FakeServer::new().responding(HttpMethod::Post, "/api/categories", 500);
        let sessions = logged_in(server).await;
        let mut executor = CaseExecutor::new(&sessions);

        seed_resources(&mut executor).await.unwrap();

        assert!(!executor.ids().contains(CATEGORY_ID));
        assert!(executor.ids().contains(PRODUCT_ID));
        assert!(!executor.rows()[0].passed());
    }

    #[tokio::test]
    async fn test_product_failure_is_fatal() {
        let server = FakeServer::new().responding(HttpMethod::Post, "/api/products", 500);
        let sessions = logged_in(server.clone()).await;
        let mut executor = CaseExecutor::new(&sessions);

        let err = seed_resources(&mut executor).await.unwrap_err();

        let ApplicationError::Seed { resource, status, detail } = err else {
            panic!("expected seed error, got {err:?}");
        };
        assert_eq!(resource, "product");
        assert_eq!(status, Some(500));
        assert!(detail.starts_with("expected 200,201, got 500: "));
        assert!(detail.contains("forced by test"));
        assert_eq!(server.calls_to(HttpMethod::Post, "/api/cart"), 0);
    }

    #[tokio::test]
    async fn test_unreachable_order_is_fatal() {
        let server = FakeServer::new().unreachable(HttpMethod::Post, "/api/orders");
        let sessions = logged_in(server).await;
        let mut executor = CaseExecutor::new(&sessions);

        let err = seed_resources(&mut executor).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Seed { ref resource, status: None, .. } if resource == "order"
        ));
    }
}
