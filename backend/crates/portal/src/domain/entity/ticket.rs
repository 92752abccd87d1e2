//! Support Ticket Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::id::{ProjectId, TicketId, UserId};
use kernel::pagination::Searchable;

use super::required_text;
use crate::domain::value_object::{ticket_priority::TicketPriority, ticket_status::TicketStatus};
use crate::error::{PortalError, PortalResult};

pub const SUBJECT_MAX_LENGTH: usize = 200;
pub const MESSAGE_MAX_LENGTH: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: TicketId,
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub subject: String,
    pub message: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(
        client_id: UserId,
        project_id: Option<ProjectId>,
        subject: &str,
        message: &str,
        priority: TicketPriority,
    ) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: TicketId::new(),
            client_id,
            project_id,
            subject: required_text("Subject", subject, SUBJECT_MAX_LENGTH)?,
            message: required_text("Message", message, MESSAGE_MAX_LENGTH)?,
            priority,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_status(&mut self, status: TicketStatus, now: DateTime<Utc>) -> PortalResult<()> {
        if self.status == TicketStatus::Closed && status != TicketStatus::Closed {
            return Err(PortalError::TicketClosed);
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }
}

impl Searchable for Ticket {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "subject" => Some(&self.subject),
            "message" => Some(&self.message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket::new(
            UserId::new(),
            None,
            "Contact form broken",
            "Submissions return an error",
            TicketPriority::High,
        )
        .unwrap()
    }

    #[test]
    fn test_new_ticket_is_open() {
        let ticket = ticket();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::High);
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert!(Ticket::new(UserId::new(), None, "", "body", TicketPriority::Low).is_err());
        assert!(Ticket::new(UserId::new(), None, "subject", "  ", TicketPriority::Low).is_err());
    }

    #[test]
    fn test_closed_tickets_stay_closed() {
        let mut ticket = ticket();
        let now = Utc::now();
        ticket.set_status(TicketStatus::Resolved, now).unwrap();
        ticket.set_status(TicketStatus::Open, now).unwrap();
        ticket.set_status(TicketStatus::Closed, now).unwrap();
        assert!(matches!(
            ticket.set_status(TicketStatus::Open, now),
            Err(PortalError::TicketClosed)
        ));
        assert!(ticket.set_status(TicketStatus::Closed, now).is_ok());
    }
}
