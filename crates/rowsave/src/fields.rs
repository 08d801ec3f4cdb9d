//! Process-wide cache of field descriptors, keyed by record type.
//!
//! Entries are populated on first use of a type and never evicted. Concurrent
//! first lookups may each call [`Record::describe`]; the first insert wins and
//! every caller gets the stored list.

use crate::record::{FieldDescriptor, Record};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type Entry = Arc<dyn Any + Send + Sync>;

fn cache() -> &'static RwLock<HashMap<TypeId, Entry>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, Entry>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

fn lookup<R: Record>(map: &HashMap<TypeId, Entry>) -> Option<Arc<Vec<FieldDescriptor<R>>>> {
    map.get(&TypeId::of::<R>())
        .cloned()
        .and_then(|entry| entry.downcast::<Vec<FieldDescriptor<R>>>().ok())
}

/// Field descriptors of `R`, computing and caching them on first use.
pub fn fields<R: Record>() -> Arc<Vec<FieldDescriptor<R>>> {
    // Fast path: already cached.
    let hit = {
        let map = cache().read().unwrap_or_else(PoisonError::into_inner);
        lookup::<R>(&map)
    };
    if let Some(hit) = hit {
        return hit;
    }

    // Don't hold the lock while the type describes itself.
    let computed = Arc::new(R::describe());
    tracing::trace!(
        target: "rowsave",
        record = std::any::type_name::<R>(),
        fields = computed.len(),
        "caching record fields"
    );

    let mut map = cache().write().unwrap_or_else(PoisonError::into_inner);
    let stored = map
        .entry(TypeId::of::<R>())
        .or_insert_with(|| computed.clone() as Entry)
        .clone();
    stored
        .downcast::<Vec<FieldDescriptor<R>>>()
        .unwrap_or(computed)
}

/// Whether descriptors for `R` have been cached already.
pub fn is_cached<R: Record>() -> bool {
    let map = cache().read().unwrap_or_else(PoisonError::into_inner);
    map.contains_key(&TypeId::of::<R>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldKind, ToValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counted {
        a: i32,
    }

    impl Record for Counted {
        const TABLE: &'static str = "Counted";

        fn describe() -> Vec<FieldDescriptor<Self>> {
            DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
            vec![FieldDescriptor::typed::<i32>("a", |r: &Self| r.a.to_value())]
        }
    }

    struct Shared {
        x: String,
    }

    impl Record for Shared {
        const TABLE: &'static str = "Shared";

        fn describe() -> Vec<FieldDescriptor<Self>> {
            vec![FieldDescriptor::typed::<String>("x", |r: &Self| r.x.to_value())]
        }
    }

    #[test]
    fn describes_each_type_once() {
        assert!(!is_cached::<Counted>());
        let first = fields::<Counted>();
        let second = fields::<Counted>();
        assert!(is_cached::<Counted>());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(first[0].name(), "a");
        assert_eq!(first[0].kind(), FieldKind::Int);
        assert_eq!(first[0].get(&Counted { a: 9 }).as_i64(), Some(9));
    }

    #[test]
    fn concurrent_first_lookups_agree() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(fields::<Shared>)).collect();
        let lists: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("lookup thread panicked"))
            .collect();
        let stored = fields::<Shared>();
        for list in &lists {
            assert!(Arc::ptr_eq(list, &stored));
        }
        assert_eq!(
            stored[0].get(&Shared { x: "v".into() }),
            crate::Value::Text("v".into())
        );
    }
}
