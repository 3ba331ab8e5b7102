// Fan-in stream merging
//
// Each subtitle service produces its own candidate stream; the selection
// loop wants a single one. `unify` relays every live producer into one
// merged channel in first-arrival order, with no deduplication (the
// best-match fold downstream handles that).

use tokio::sync::mpsc;

const MERGE_BUFFER: usize = 32;

/// Merges any number of optional producer streams into a single stream.
///
/// Absent producers (services that failed to initialize) are skipped. One
/// forwarding task per live producer relays items into the merged output;
/// each task owns a clone of the output sender, so the merged stream
/// closes exactly when the last producer closes. With no live producers
/// the output closes immediately.
pub fn unify<T: Send + 'static>(streams: Vec<Option<mpsc::Receiver<T>>>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(MERGE_BUFFER);

    for mut stream in streams.into_iter().flatten() {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(item) = stream.recv().await {
                if tx.send(item).await.is_err() {
                    // Consumer is gone; stop relaying.
                    break;
                }
            }
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer(items: Vec<u32>) -> mpsc::Receiver<u32> {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            for item in items {
                tx.send(item).await.unwrap();
            }
        });
        rx
    }

    #[tokio::test]
    async fn test_unify_merges_all_items_then_closes() {
        let streams = vec![
            Some(producer(vec![1, 2])),
            None,
            Some(producer(vec![3, 4, 5])),
        ];

        let mut merged = unify(streams);
        let mut items = Vec::new();
        while let Some(item) = merged.recv().await {
            items.push(item);
        }

        // No ordering guarantee across producers.
        items.sort();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_unify_empty_input_closes_immediately() {
        let mut merged = unify(Vec::<Option<mpsc::Receiver<u32>>>::new());
        assert!(merged.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unify_all_absent_closes_immediately() {
        let mut merged = unify(vec![None::<mpsc::Receiver<u32>>, None, None]);
        assert!(merged.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unify_single_producer_preserves_order() {
        let mut merged = unify(vec![Some(producer(vec![7, 8, 9]))]);
        assert_eq!(merged.recv().await, Some(7));
        assert_eq!(merged.recv().await, Some(8));
        assert_eq!(merged.recv().await, Some(9));
        assert!(merged.recv().await.is_none());
    }
}
