//! Fixed-size worker pool over a shared work index.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Runs `per_item` on every element of `items` with `workers` threads.
///
/// Each worker claims the next index with an atomic fetch-and-increment and
/// stops once the index runs past the end, so every item is processed exactly
/// once. `progress` receives the 1-based number of items claimed so far.
///
/// Results are collected in completion order; callers needing a stable order
/// sort them.
///
/// ```
/// let items: Vec<usize> = (1..=5).collect();
/// let mut out = nestedin::libs::batch::run(&items, 3, |i| Some(i.to_string()), |_| {}).unwrap();
/// out.sort();
/// assert_eq!(out, vec!["1", "2", "3", "4", "5"]);
/// ```
pub fn run<T, F, P>(
    items: &[T],
    workers: usize,
    per_item: F,
    progress: P,
) -> anyhow::Result<Vec<String>>
where
    T: Sync,
    F: Fn(&T) -> Option<String> + Sync,
    P: Fn(usize) + Sync,
{
    let cursor = AtomicUsize::new(0);
    let results: Mutex<Vec<String>> = Mutex::new(vec![]);

    crossbeam::scope(|s| {
        for _ in 0..workers.max(1) {
            s.spawn(|_| loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };
                progress(index + 1);

                if let Some(out) = per_item(item).filter(|s| !s.is_empty()) {
                    results
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push(out);
                }
            });
        }
    })
    .map_err(|_| anyhow::anyhow!("a worker thread panicked"))?;

    Ok(results.into_inner().unwrap_or_else(|e| e.into_inner()))
}
