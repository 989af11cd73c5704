//! In-memory record repository.

use crate::error::{ServerError, ServerResult};
use gardonyi_model::{EntityId, Record};
use gardonyi_protocol::{Direction, ListQuery, ListResponse};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// In-memory storage for one entity type.
///
/// The repository maintains:
/// - Records keyed by id
/// - The next id to assign (ids are never reused)
pub struct Repository<R: Record> {
    records: RwLock<BTreeMap<EntityId, R>>,
    next_id: RwLock<i64>,
}

impl<R: Record> Repository<R> {
    /// Creates an empty repository. The first assigned id is 1.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
        }
    }

    /// Stores a new record under a freshly assigned id.
    pub fn insert(&self, mut record: R) -> R {
        let mut next = self.next_id.write();
        let id = EntityId::new(*next);
        *next += 1;
        record.set_id(Some(id));
        self.records.write().insert(id, record.clone());
        record
    }

    /// Replaces the record stored under its id.
    pub fn save(&self, record: R) -> ServerResult<R> {
        let id = record
            .id()
            .ok_or_else(|| ServerError::Internal("save without id".into()))?;
        self.records.write().insert(id, record.clone());
        Ok(record)
    }

    /// Applies `f` to a copy of the stored record and saves the result, all
    /// under one write lock. Nothing is stored if `f` fails.
    pub fn modify<F>(&self, id: EntityId, f: F) -> ServerResult<R>
    where
        F: FnOnce(&mut R) -> ServerResult<()>,
    {
        let mut records = self.records.write();
        let mut record = records
            .get(&id)
            .cloned()
            .ok_or_else(|| ServerError::NotFound {
                entity: R::ENTITY_NAME.to_string(),
                id,
            })?;
        f(&mut record)?;
        record.set_id(Some(id));
        records.insert(id, record.clone());
        Ok(record)
    }

    /// Returns the record with the given id.
    pub fn find(&self, id: EntityId) -> Option<R> {
        self.records.read().get(&id).cloned()
    }

    /// Returns true if a record with the given id exists.
    pub fn exists(&self, id: EntityId) -> bool {
        self.records.read().contains_key(&id)
    }

    /// Removes a record. Returns true if it existed.
    pub fn delete(&self, id: EntityId) -> bool {
        self.records.write().remove(&id).is_some()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Returns one sorted page of records and the total count.
    pub fn find_page(&self, query: &ListQuery) -> ServerResult<ListResponse<R>> {
        let field = query.sort.field.as_str();
        if field != "id" && !R::FIELD_NAMES.contains(&field) {
            return Err(ServerError::InvalidRequest(format!(
                "cannot sort {} by `{}`",
                R::ENTITY_NAME,
                field
            )));
        }

        let records = self.records.read();
        let total = records.len() as u64;
        let mut all: Vec<&R> = records.values().collect();

        if field != "id" {
            // Records with equal keys keep id order.
            all.sort_by(|a, b| compare_field(*a, *b, field));
        }
        if query.sort.direction == Direction::Desc {
            all.reverse();
        }

        let items = all
            .into_iter()
            .skip(query.offset())
            .take(query.size as usize)
            .cloned()
            .collect();

        Ok(ListResponse::new(items, total))
    }
}

impl<R: Record> Default for Repository<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_field<R: Record>(a: &R, b: &R, field: &str) -> Ordering {
    a.field(field)
        .flatten()
        .cmp(&b.field(field).flatten())
        .then_with(|| a.id().cmp(&b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardonyi_model::Page;
    use gardonyi_protocol::Sort;

    fn seeded(titles: &[&str]) -> Repository<Page> {
        let repo = Repository::new();
        for title in titles {
            repo.insert(Page::new(*title, "body"));
        }
        repo
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let repo = seeded(&["a", "b"]);
        assert!(repo.delete(EntityId::new(2)));
        let page = repo.insert(Page::new("c", "body"));
        assert_eq!(page.id, Some(EntityId::new(3)));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn modify_keeps_id() {
        let repo = seeded(&["a"]);
        let updated = repo
            .modify(EntityId::new(1), |p| {
                p.title = Some("z".into());
                p.id = None;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.id, Some(EntityId::new(1)));
        assert_eq!(repo.find(EntityId::new(1)), Some(updated));
        assert!(matches!(
            repo.modify(EntityId::new(9), |_| Ok(())),
            Err(ServerError::NotFound { .. })
        ));
    }

    #[test]
    fn failed_modify_stores_nothing() {
        let repo = seeded(&["a"]);
        let result = repo.modify(EntityId::new(1), |p| {
            p.title = Some("changed".into());
            Err(ServerError::InvalidRequest("rejected".into()))
        });
        assert!(result.is_err());
        assert_eq!(
            repo.find(EntityId::new(1)).unwrap().title.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn paging_and_total() {
        let repo = seeded(&["a", "b", "c", "d", "e"]);
        let page = repo.find_page(&ListQuery::new(1, 2)).unwrap();
        assert_eq!(page.total_count, 5);
        let ids: Vec<i64> = page.items.iter().map(|p| p.id.unwrap().get()).collect();
        assert_eq!(ids, vec![3, 4]);

        let past_end = repo.find_page(&ListQuery::new(10, 2)).unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_count, 5);
    }

    #[test]
    fn sort_by_field_and_direction() {
        let repo = seeded(&["b", "c", "a"]);
        let page = repo
            .find_page(&ListQuery::new(0, 10).with_sort(Sort::asc("title")))
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|p| p.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        let page = repo
            .find_page(&ListQuery::new(0, 10).with_sort(Sort::desc("id")))
            .unwrap();
        assert_eq!(page.items[0].id, Some(EntityId::new(3)));
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let repo = seeded(&["a"]);
        let result = repo.find_page(&ListQuery::new(0, 10).with_sort(Sort::asc("author")));
        assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
    }
}
