//! # Order Flow
//!
//! The order state machine: transition table and role narrowing.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │                  ┌──────────────┐                                       │
//! │   create ──────► │     OPEN     │ ── waiter ──┐                         │
//! │   (table FREE    └──────┬───────┘             │                         │
//! │    → OCCUPIED)          │ waiter              │                         │
//! │                  ┌──────▼───────┐             │                         │
//! │                  │ PREPARATION  │ ────────────┤                         │
//! │                  └──────┬───────┘             │                         │
//! │                         │ kitchen             ▼                         │
//! │                  ┌──────▼───────┐      ┌─────────────┐                  │
//! │                  │    SERVED    │ ───► │  CANCELLED  │ (frees table)    │
//! │                  └──────┬───────┘      └─────────────┘                  │
//! │                         │ payment path only                             │
//! │                  ┌──────▼───────┐                                       │
//! │                  │     PAID     │ (frees table, consumes inventory)     │
//! │                  └──────────────┘                                       │
//! │                                                                         │
//! │  PAID and CANCELLED are terminal. PAID is never a valid target of a     │
//! │  direct transition call; only the cash register's payment path sets it. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is a plain constant so the boundary layer can render it and so
//! tightening a rule (e.g. forbidding Served → Cancelled) is a one-line edit.

use crate::error::{CoreError, CoreResult};
use crate::types::{OrderStatus, Role};

/// The full transition table: (from, allowed targets).
///
/// `Paid` appears in no target list on purpose; see [`check_transition`].
pub const TRANSITIONS: &[(OrderStatus, &[OrderStatus])] = &[
    (
        OrderStatus::Open,
        &[OrderStatus::Preparation, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::Preparation,
        &[OrderStatus::Served, OrderStatus::Cancelled],
    ),
    (OrderStatus::Served, &[OrderStatus::Cancelled]),
];

impl OrderStatus {
    /// Whether the order admits no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Consults the transition table.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, targets)| targets.contains(&next))
            .unwrap_or(false)
    }
}

impl Role {
    /// Role narrowing over direct transitions.
    ///
    /// Waitstaff may only send to preparation or cancel; kitchen staff may
    /// only mark served; admins drive anything the table allows; cashiers
    /// act through the payment path, never through direct transitions.
    pub fn may_transition_to(&self, next: OrderStatus) -> bool {
        match self {
            Role::Admin => true,
            Role::Waiter => {
                matches!(next, OrderStatus::Preparation | OrderStatus::Cancelled)
            }
            Role::Kitchen => matches!(next, OrderStatus::Served),
            Role::Cashier => false,
        }
    }
}

/// Validates a direct transition request for an order in state `from`,
/// driven by `role`, targeting `next`.
///
/// ## Check Order
/// 1. Terminal orders reject everything (state conflict).
/// 2. `Paid` is rejected outright: only the payment path reaches it.
/// 3. Role narrowing.
/// 4. The transition table itself.
pub fn check_transition(
    order_id: &str,
    from: OrderStatus,
    next: OrderStatus,
    role: Role,
) -> CoreResult<()> {
    if from.is_terminal() {
        return Err(CoreError::OrderFinalized {
            order_id: order_id.to_string(),
            status: from,
        });
    }
    if next == OrderStatus::Paid {
        return Err(CoreError::InvalidTransition { from, to: next });
    }
    if !role.may_transition_to(next) {
        return Err(CoreError::RoleNotAllowed { role, to: next });
    }
    if !from.can_transition_to(next) {
        return Err(CoreError::InvalidTransition { from, to: next });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;

        assert!(Open.can_transition_to(Preparation));
        assert!(Open.can_transition_to(Cancelled));
        assert!(!Open.can_transition_to(Served));

        assert!(Preparation.can_transition_to(Served));
        assert!(Preparation.can_transition_to(Cancelled));
        assert!(!Preparation.can_transition_to(Open));

        // Served → Cancelled is permitted by the observed business rule.
        assert!(Served.can_transition_to(Cancelled));
        assert!(!Served.can_transition_to(Open));

        // Paid is never a direct-transition target.
        assert!(!Open.can_transition_to(Paid));
        assert!(!Preparation.can_transition_to(Paid));
        assert!(!Served.can_transition_to(Paid));

        // Terminal states go nowhere.
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Open));
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Open.is_terminal());
        assert!(!OrderStatus::Preparation.is_terminal());
        assert!(!OrderStatus::Served.is_terminal());
    }

    #[test]
    fn test_role_narrowing() {
        use OrderStatus::*;

        assert!(Role::Waiter.may_transition_to(Preparation));
        assert!(Role::Waiter.may_transition_to(Cancelled));
        assert!(!Role::Waiter.may_transition_to(Served));

        assert!(Role::Kitchen.may_transition_to(Served));
        assert!(!Role::Kitchen.may_transition_to(Preparation));
        assert!(!Role::Kitchen.may_transition_to(Cancelled));

        assert!(Role::Admin.may_transition_to(Served));
        assert!(Role::Admin.may_transition_to(Cancelled));

        assert!(!Role::Cashier.may_transition_to(Preparation));
        assert!(!Role::Cashier.may_transition_to(Served));
    }

    #[test]
    fn test_check_transition_happy_path() {
        assert!(check_transition(
            "o1",
            OrderStatus::Open,
            OrderStatus::Preparation,
            Role::Waiter
        )
        .is_ok());
        assert!(check_transition(
            "o1",
            OrderStatus::Preparation,
            OrderStatus::Served,
            Role::Kitchen
        )
        .is_ok());
    }

    #[test]
    fn test_check_transition_rejects_terminal() {
        let err = check_transition(
            "o1",
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            Role::Admin,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OrderFinalized { .. }));
    }

    #[test]
    fn test_check_transition_rejects_paid_target() {
        let err = check_transition("o1", OrderStatus::Served, OrderStatus::Paid, Role::Admin)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_check_transition_rejects_role() {
        let err = check_transition(
            "o1",
            OrderStatus::Preparation,
            OrderStatus::Served,
            Role::Waiter,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::RoleNotAllowed { .. }));
    }
}
