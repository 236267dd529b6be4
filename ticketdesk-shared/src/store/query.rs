/// Composable ticket filters
///
/// A [`TicketQuery`] is an ordered list of [`TicketPredicate`]s combined with
/// AND, plus an optional row cap. Predicates are only added when their
/// input is present, so optional request parameters map directly onto
/// `where_some` calls:
///
/// ```
/// use ticketdesk_shared::store::query::{TicketPredicate, TicketQuery};
///
/// let user_id: Option<i32> = Some(1);
/// let assignee: Option<i32> = None;
///
/// let query = TicketQuery::new()
///     .where_some(user_id, TicketPredicate::OwnedBy)
///     .where_some(assignee, TicketPredicate::AssignedTo)
///     .take_if_positive(Some(20));
///
/// assert_eq!(query.predicates(), &[TicketPredicate::OwnedBy(1)]);
/// assert_eq!(query.limit(), Some(20));
/// ```
///
/// The same query is evaluated in memory by [`TicketQuery::matches`] and
/// rendered into SQL by [`TicketQuery::push_where`]. The SQL form expects the
/// tickets table aliased as `t` and the owning users table as `u`.

use crate::models::{
    ticket::{Ticket, TicketStatus},
    user::User,
};
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

/// A single condition on a ticket (and its owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketPredicate {
    /// Owned by the given user
    OwnedBy(i32),

    /// Created strictly before the instant
    CreatedBefore(DateTime<Utc>),

    /// Created strictly after the instant
    CreatedAfter(DateTime<Utc>),

    /// Has an assignee and it is the given employee
    AssignedTo(i32),

    /// Has exactly this status
    HasStatus(TicketStatus),

    /// Owner's active flag equals the value
    OwnerActive(bool),
}

impl TicketPredicate {
    /// Evaluates the predicate against a ticket and its owner
    pub fn matches(&self, ticket: &Ticket, owner: &User) -> bool {
        match *self {
            TicketPredicate::OwnedBy(user_id) => ticket.user_id == user_id,
            TicketPredicate::CreatedBefore(instant) => ticket.created_at < instant,
            TicketPredicate::CreatedAfter(instant) => ticket.created_at > instant,
            TicketPredicate::AssignedTo(employee_id) => {
                ticket.assigned_to_employee_id == Some(employee_id)
            }
            TicketPredicate::HasStatus(status) => ticket.status == status,
            TicketPredicate::OwnerActive(active) => owner.is_active == active,
        }
    }

    /// Appends the predicate as a SQL boolean expression
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            TicketPredicate::OwnedBy(user_id) => {
                builder.push("t.user_id = ").push_bind(user_id);
            }
            TicketPredicate::CreatedBefore(instant) => {
                builder.push("t.created_at < ").push_bind(instant);
            }
            TicketPredicate::CreatedAfter(instant) => {
                builder.push("t.created_at > ").push_bind(instant);
            }
            TicketPredicate::AssignedTo(employee_id) => {
                builder
                    .push("(t.assigned_to_employee_id IS NOT NULL AND t.assigned_to_employee_id = ")
                    .push_bind(employee_id)
                    .push(")");
            }
            TicketPredicate::HasStatus(status) => {
                builder.push("t.status = ").push_bind(status.as_str());
            }
            TicketPredicate::OwnerActive(active) => {
                builder.push("u.is_active = ").push_bind(active);
            }
        }
    }
}

/// Conjunction of ticket predicates with an optional row cap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    predicates: Vec<TicketPredicate>,
    limit: Option<i64>,
}

impl TicketQuery {
    /// An empty query matching every ticket
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate unconditionally
    pub fn filter(mut self, predicate: TicketPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds the predicate only when `condition` holds
    pub fn where_if(self, condition: bool, predicate: TicketPredicate) -> Self {
        if condition {
            self.filter(predicate)
        } else {
            self
        }
    }

    /// Adds a predicate built from `value` only when it is present
    pub fn where_some<T>(self, value: Option<T>, predicate: impl FnOnce(T) -> TicketPredicate) -> Self {
        match value {
            Some(value) => self.filter(predicate(value)),
            None => self,
        }
    }

    /// Caps the number of returned tickets
    pub fn take(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Caps the result only for a present, positive count
    ///
    /// `None`, zero and negative counts leave the query uncapped.
    pub fn take_if_positive(self, count: Option<i32>) -> Self {
        match count {
            Some(count) if count > 0 => self.take(i64::from(count)),
            _ => self,
        }
    }

    pub fn predicates(&self) -> &[TicketPredicate] {
        &self.predicates
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    /// True when every predicate holds
    pub fn matches(&self, ticket: &Ticket, owner: &User) -> bool {
        self.predicates.iter().all(|p| p.matches(ticket, owner))
    }

    /// Appends ` WHERE p1 AND p2 ...` (nothing for an empty query)
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(builder);
        }
    }

    /// Appends ` LIMIT n` when a cap is set
    pub fn push_limit(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(limit) = self.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
    }
}
