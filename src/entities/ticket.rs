use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::sea_orm_active_enums::{TicketPriority, TicketStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub category: Option<String>,
    pub assigned_to: Option<i32>,
    pub created_by: i32,
    pub location: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub resolved_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Resolution timestamp a ticket carries once it moves to `next`.
///
/// The first move into resolved/closed stamps `now`; an existing stamp is kept
/// forever, including when the ticket is reopened.
pub fn resolution_stamp(
    current: Option<DateTime>,
    next: TicketStatus,
    now: DateTime,
) -> Option<DateTime> {
    match current {
        Some(stamped) => Some(stamped),
        None if next.is_terminal() => Some(now),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32) -> DateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn resolving_an_open_ticket_stamps_now() {
        assert_eq!(resolution_stamp(None, TicketStatus::Resolved, at(9)), Some(at(9)));
        assert_eq!(resolution_stamp(None, TicketStatus::Closed, at(9)), Some(at(9)));
    }

    #[test]
    fn starting_work_leaves_stamp_empty() {
        assert_eq!(resolution_stamp(None, TicketStatus::InProgress, at(9)), None);
        assert_eq!(resolution_stamp(None, TicketStatus::Open, at(9)), None);
    }

    #[test]
    fn closing_a_resolved_ticket_keeps_first_stamp() {
        let later = at(9) + Duration::hours(3);
        assert_eq!(
            resolution_stamp(Some(at(9)), TicketStatus::Closed, later),
            Some(at(9))
        );
    }

    #[test]
    fn reopening_never_clears_stamp() {
        assert_eq!(
            resolution_stamp(Some(at(9)), TicketStatus::Open, at(10)),
            Some(at(9))
        );
    }
}
