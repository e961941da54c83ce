//! Property tests for stop idempotence and stream ordering

mod common;

use bgdl_events::TransferEvent;
use bgdl_session::StartRequest;
use common::harness;
use futures::StreamExt;
use proptest::prelude::*;

const TRACKED: &str = "https://example.com/tracked.bin";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stop_on_untracked_uri_is_a_no_op(uri in "[a-z]{1,8}://[a-z0-9./_-]{0,40}") {
        prop_assume!(uri != TRACKED);
        runtime().block_on(async {
            let h = harness().await;
            let _stream = h
                .session
                .start(StartRequest::new(TRACKED, "app-data:///tracked.bin"))
                .await;

            prop_assert!(h.session.stop(&uri).await.is_ok());
            prop_assert_eq!(h.session.tracked_uris(), vec![TRACKED.to_string()]);
            prop_assert_eq!(h.service.transfer(TRACKED).cancels(), 0);
            Ok(())
        })?;
    }

    #[test]
    fn progress_is_monotonic_and_terminal_is_last(
        updates in proptest::collection::vec(0u64..10_000, 0..40),
    ) {
        runtime().block_on(async {
            let h = harness().await;
            let stream = h
                .session
                .start(StartRequest::new(TRACKED, "app-data:///tracked.bin"))
                .await;
            let transfer = h.service.transfer(TRACKED);

            let consumer = tokio::spawn(stream.collect::<Vec<_>>());
            for bytes in updates {
                transfer.progress(bytes, Some(10_000));
                tokio::task::yield_now().await;
            }
            transfer.complete();
            let events = consumer.await.unwrap();

            let (last, rest) = events.split_last().unwrap();
            prop_assert!(matches!(last, TransferEvent::Completed));
            prop_assert!(rest.iter().all(|e| !e.is_terminal()));

            let received: Vec<u64> = rest
                .iter()
                .filter_map(TransferEvent::progress)
                .map(|p| p.bytes_received)
                .collect();
            prop_assert!(received.windows(2).all(|w| w[0] <= w[1]));
            Ok(())
        })?;
    }
}
