//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records, queries and state machine
//! actions.

use gardonyi_client::{Action, Operation};
use gardonyi_model::{EntityId, Page, Post};
use gardonyi_protocol::{ListQuery, Sort};
use proptest::prelude::*;

/// Strategy for generating valid entity ids.
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    (1i64..10_000).prop_map(EntityId::new)
}

/// Strategy for generating short text that fits a `varchar` column.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 áéőű]{0,40}").expect("Invalid regex")
}

/// Strategy for generating optional text fields.
pub fn optional_text_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(text_strategy())
}

/// Strategy for generating unsaved, valid pages.
pub fn page_strategy() -> impl Strategy<Value = Page> {
    (text_strategy(), text_strategy()).prop_map(|(title, content)| Page::new(title, content))
}

/// Strategy for generating unsaved, valid posts.
pub fn post_strategy() -> impl Strategy<Value = Post> {
    (text_strategy(), text_strategy(), text_strategy())
        .prop_map(|(title, content, author)| Post::new(title, content, author))
}

/// Strategy for generating post patches (any subset of fields).
pub fn post_patch_strategy() -> impl Strategy<Value = Post> {
    (
        optional_text_strategy(),
        optional_text_strategy(),
        optional_text_strategy(),
    )
        .prop_map(|(title, content, author)| Post {
            id: None,
            title,
            content,
            author,
        })
}

/// Strategy for generating page sort orders.
pub fn page_sort_strategy() -> impl Strategy<Value = Sort> {
    (prop_oneof![Just("id"), Just("title"), Just("content")], any::<bool>()).prop_map(
        |(field, asc)| {
            if asc {
                Sort::asc(field)
            } else {
                Sort::desc(field)
            }
        },
    )
}

/// Strategy for generating list queries over pages.
pub fn list_query_strategy() -> impl Strategy<Value = ListQuery> {
    (0u32..5, 1u32..10, page_sort_strategy())
        .prop_map(|(page, size, sort)| ListQuery::new(page, size).with_sort(sort))
}

/// Strategy for generating operations.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::List),
        Just(Operation::Get),
        Just(Operation::Create),
        Just(Operation::Update),
        Just(Operation::PartialUpdate),
        Just(Operation::Delete),
    ]
}

/// Strategy for generating persisted pages.
pub fn saved_page_strategy() -> impl Strategy<Value = Page> {
    (page_strategy(), entity_id_strategy()).prop_map(|(page, id)| Page {
        id: Some(id),
        ..page
    })
}

/// Strategy for generating arbitrary, possibly invalid, reducer actions.
pub fn action_strategy() -> impl Strategy<Value = Action<Page>> {
    prop_oneof![
        3 => operation_strategy().prop_map(Action::Pending),
        2 => (prop::collection::vec(saved_page_strategy(), 0..3), 0u64..50, 0u64..8)
            .prop_map(|(items, total, seq)| Action::ListFulfilled { items, total, seq }),
        2 => (saved_page_strategy(), 0u64..8)
            .prop_map(|(record, seq)| Action::EntityFulfilled { record, seq }),
        1 => saved_page_strategy().prop_map(Action::WriteFulfilled),
        1 => Just(Action::DeleteFulfilled),
        1 => (operation_strategy(), 0u64..8).prop_map(|(operation, seq)| Action::Rejected {
            operation,
            message: "failed".to_string(),
            seq,
        }),
        1 => Just(Action::Reset),
    ]
}

/// Strategy for generating a sequence of reducer actions.
pub fn action_sequence_strategy(
    min_actions: usize,
    max_actions: usize,
) -> impl Strategy<Value = Vec<Action<Page>>> {
    prop::collection::vec(action_strategy(), min_actions..max_actions)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
