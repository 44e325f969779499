//! Admission-order and retry tests for the rate limiter.

use giotto_error::{GiottoResult, OperationError, OperationErrorKind};
use giotto_rate_limit::{RateLimiter, RateLimiterConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

fn http_error(status_code: u16) -> giotto_error::GiottoError {
    OperationError::new(OperationErrorKind::Http {
        status_code,
        message: "provider error".to_string(),
    })
    .into()
}

#[tokio::test(start_paused = true)]
async fn reservoir_admits_three_then_two_after_refill_in_order() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .name("burst")
            .reservoir_max(3u32)
            .refill_amount(3u32)
            .refill_interval(Duration::from_millis(1000))
            .build()
            .unwrap(),
    );

    let started = Instant::now();
    let admissions: Arc<Mutex<Vec<(usize, Duration)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();

    for index in 0..5 {
        let limiter = limiter.clone();
        let admissions = Arc::clone(&admissions);
        handles.push(tokio::spawn(async move {
            limiter
                .schedule(|| async {
                    admissions.lock().await.push((index, started.elapsed()));
                    Ok(())
                })
                .await
        }));
        // Submission order must match spawn order for the FIFO assertion.
        tokio::task::yield_now().await;
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let admissions = admissions.lock().await;
    let order: Vec<usize> = admissions.iter().map(|(index, _)| *index).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    for (_, at) in admissions.iter().take(3) {
        assert!(*at < Duration::from_millis(1000));
    }
    for (_, at) in admissions.iter().skip(3) {
        assert!(*at >= Duration::from_millis(1000));
    }
}

#[tokio::test(start_paused = true)]
async fn min_interval_spaces_admissions() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .name("spaced")
            .reservoir_max(10u32)
            .refill_amount(10u32)
            .refill_interval(Duration::from_secs(600))
            .min_interval(Duration::from_millis(200))
            .build()
            .unwrap(),
    );

    let admissions: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();

    for _ in 0..3 {
        let limiter = limiter.clone();
        let admissions = Arc::clone(&admissions);
        handles.push(tokio::spawn(async move {
            limiter
                .schedule(|| async {
                    admissions.lock().await.push(Instant::now());
                    Ok(())
                })
                .await
        }));
        tokio::task::yield_now().await;
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let admissions = admissions.lock().await;
    assert_eq!(admissions.len(), 3);
    for pair in admissions.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(200));
    }
}

#[tokio::test(start_paused = true)]
async fn execute_retries_transient_errors_until_success() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .name("retry")
            .reservoir_max(10u32)
            .refill_amount(10u32)
            .refill_interval(Duration::from_secs(60))
            .build()
            .unwrap(),
    );

    let attempts = Arc::new(AtomicUsize::new(0));
    let op_attempts = Arc::clone(&attempts);
    let result: GiottoResult<&str> = limiter
        .execute(move || {
            let attempts = Arc::clone(&op_attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(http_error(503))
                } else {
                    Ok("generated content")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "generated content");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn execute_fails_permanent_errors_immediately() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .name("retry")
            .reservoir_max(10u32)
            .refill_amount(10u32)
            .refill_interval(Duration::from_secs(60))
            .build()
            .unwrap(),
    );

    let attempts = Arc::new(AtomicUsize::new(0));
    let op_attempts = Arc::clone(&attempts);
    let result: GiottoResult<&str> = limiter
        .execute(move || {
            let attempts = Arc::clone(&op_attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(http_error(401))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn schedule_never_retries() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .name("no-retry")
            .reservoir_max(10u32)
            .refill_amount(10u32)
            .refill_interval(Duration::from_secs(60))
            .build()
            .unwrap(),
    );

    let attempts = Arc::new(AtomicUsize::new(0));
    let op_attempts = Arc::clone(&attempts);
    let result: GiottoResult<()> = limiter
        .schedule(move || {
            let attempts = Arc::clone(&op_attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(http_error(503))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
