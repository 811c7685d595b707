use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use holotrack_core::{DomainError, DomainResult, Entity, IssueId, IssueNo};
use holotrack_inventory::{allocate, total_available, Allocation, CartonBox};

use crate::permit::{parse_permits, Permit};

/// Request to issue holograms against permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub issue_no: String,
    pub total_required: u64,
    /// Raw permit text, one `PERMIT_NO|YYYY-MM-DD` per line.
    pub permit_text: String,
    pub issue_date: NaiveDate,
}

/// A recorded issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub issue_no: IssueNo,
    pub issue_date: NaiveDate,
    pub total_required: u64,
    pub series_from: u64,
    pub series_to: u64,
    pub permits: Vec<Permit>,
}

impl Entity for Issue {
    type Id = IssueId;
    type Key = IssueNo;

    fn id(&self) -> IssueId {
        self.id
    }

    fn key(&self) -> &IssueNo {
        &self.issue_no
    }
}

impl Issue {
    /// Permit numbers joined for display ("P-1, P-2").
    pub fn permit_numbers(&self) -> String {
        self.permits
            .iter()
            .map(|p| p.permit_no.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything a store must persist for one issuance, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePlan {
    pub issue_no: IssueNo,
    pub issue_date: NaiveDate,
    pub total_required: u64,
    pub allocation: Allocation,
    pub permits: Vec<Permit>,
}

impl IssuePlan {
    pub fn into_issue(self, id: IssueId) -> Issue {
        Issue {
            id,
            issue_no: self.issue_no,
            issue_date: self.issue_date,
            total_required: self.total_required,
            series_from: self.allocation.series_from,
            series_to: self.allocation.series_to,
            permits: self.permits,
        }
    }
}

/// Decide an issuance against a working copy of the boxes.
///
/// Stores call this inside their unit of work with `boxes` loaded from the
/// same transaction. On success the working copy holds the new counters; on
/// failure it is left exactly as passed in.
pub fn plan_issue(
    request: &IssueRequest,
    issue_no_taken: bool,
    boxes: &mut [CartonBox],
) -> DomainResult<IssuePlan> {
    if issue_no_taken {
        return Err(DomainError::duplicate("issue", request.issue_no.trim()));
    }

    let issue_no = IssueNo::new(&request.issue_no)?;
    if request.total_required == 0 {
        return Err(DomainError::validation("total required must be at least 1"));
    }

    let available = total_available(boxes.iter());
    if request.total_required > available {
        return Err(DomainError::InsufficientStock {
            requested: request.total_required,
            available,
        });
    }

    let allocation = allocate(boxes, request.total_required).map_err(race_on_exhaustion)?;

    let permits = match parse_permits(&request.permit_text) {
        Ok(p) => p,
        Err(e) => {
            allocation.revert(boxes);
            return Err(e);
        }
    };

    Ok(IssuePlan {
        issue_no,
        issue_date: request.issue_date,
        total_required: request.total_required,
        allocation,
        permits,
    })
}

/// A walk that runs dry after the stock check passed means the boxes changed
/// underneath the plan.
fn race_on_exhaustion(err: DomainError) -> DomainError {
    match err {
        DomainError::Exhausted { requested, .. } => DomainError::AllocationRace { requested },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holotrack_core::CartonId;
    use holotrack_inventory::validate_carton;
    use proptest::prelude::*;

    fn stock() -> Vec<CartonBox> {
        validate_carton("C-1", 1, 100_000).unwrap().boxes(CartonId::new(1))
    }

    fn request(no: &str, qty: u64, permits: &str) -> IssueRequest {
        IssueRequest {
            issue_no: no.to_string(),
            total_required: qty,
            permit_text: permits.to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
        }
    }

    #[test]
    fn plans_allocation_and_permits() {
        let mut boxes = stock();
        let plan = plan_issue(&request("I-1", 25_000, "P-100|2024-03-15\nP-101|2024-03-16"), false, &mut boxes)
            .unwrap();

        assert_eq!(plan.issue_no.as_str(), "I-1");
        assert_eq!((plan.allocation.series_from, plan.allocation.series_to), (1, 25_000));
        assert_eq!(plan.permits.len(), 2);
        assert_eq!(boxes[0].issued_upto, 20_000);
        assert_eq!(boxes[1].issued_upto, 5_000);

        let issue = plan.into_issue(IssueId::new(1));
        assert_eq!(issue.series_to, 25_000);
        assert_eq!(issue.permit_numbers(), "P-100, P-101");
    }

    #[test]
    fn duplicate_issue_no_is_checked_first() {
        let mut boxes = stock();
        let err = plan_issue(&request("I-1", 500_000, "P|bad"), true, &mut boxes).unwrap_err();
        assert_eq!(err, DomainError::duplicate("issue", "I-1"));
    }

    #[test]
    fn insufficient_stock_reports_available() {
        let mut boxes = stock();
        boxes[0].issued_upto = 100;
        let before = boxes.clone();

        let err = plan_issue(&request("I-1", 100_000, ""), false, &mut boxes).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 100_000,
                available: 99_900
            }
        );
        assert_eq!(boxes, before);
    }

    #[test]
    fn bad_permit_date_reverts_allocation() {
        let mut boxes = stock();
        boxes[0].issued_upto = 42;
        let before = boxes.clone();

        let err = plan_issue(&request("I-1", 30_000, "P-100|2024-03-15\nP-200|15-03-2024"), false, &mut boxes)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPermitDate { ref permit_no, .. } if permit_no == "P-200"));
        assert_eq!(boxes, before);
    }

    #[test]
    fn zero_quantity_and_blank_number_are_rejected() {
        let mut boxes = stock();
        assert!(matches!(
            plan_issue(&request("I-1", 0, ""), false, &mut boxes),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            plan_issue(&request("  ", 1, ""), false, &mut boxes),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn exact_stock_is_issued() {
        let mut boxes = stock();
        let plan = plan_issue(&request("I-1", 100_000, ""), false, &mut boxes).unwrap();
        assert_eq!(plan.allocation.series_to, 100_000);
        assert_eq!(total_available(&boxes), 0);
    }

    #[test]
    fn exhausted_walk_becomes_allocation_race() {
        let mut boxes = stock();
        let err = allocate(&mut boxes, 100_001).map_err(race_on_exhaustion).unwrap_err();
        assert_eq!(err, DomainError::AllocationRace { requested: 100_001 });

        let err = race_on_exhaustion(DomainError::validation("x"));
        assert_eq!(err, DomainError::validation("x"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: a plan either consumes exactly the requested quantity or
        /// leaves every box counter as it was.
        #[test]
        fn plans_are_all_or_nothing(
            issued in 0u64..20_000u64,
            qty in 0u64..120_000u64,
            bad_permit in any::<bool>(),
        ) {
            let mut boxes = stock();
            boxes[0].issued_upto = issued;
            let before = boxes.clone();
            let available = total_available(&boxes);

            let permits = if bad_permit { "P-1|2024-03-01\nP-2|01/03/2024" } else { "P-1|2024-03-01" };
            match plan_issue(&request("I-1", qty, permits), false, &mut boxes) {
                Ok(plan) => {
                    prop_assert!(!bad_permit);
                    prop_assert_eq!(total_available(&boxes), available - qty);
                    prop_assert_eq!(plan.allocation.series_to - plan.allocation.series_from + 1, qty);
                }
                Err(_) => {
                    prop_assert!(bad_permit || qty == 0 || qty > available);
                    prop_assert_eq!(&boxes, &before);
                }
            }
        }
    }
}
