//! Milestone rollover
//!
//! After a successful publish, the open "Next Version" milestone is renamed
//! to the release tag and closed, and a fresh "Next Version" milestone is
//! opened. The rename and close travel in a single update so a failure can
//! never leave a half-renamed milestone behind, and the fresh milestone is
//! only created once the close has succeeded.

use crate::core::error::{ApiError, ResultExt, ShipyardError, ShipyardResult};
use crate::github::{MilestoneApi, MilestoneInfo};

/// Title of the rolling milestone that collects work for the next release
pub const NEXT_VERSION_TITLE: &str = "Next Version";

/// Roll the "Next Version" milestone over to the released tag.
///
/// Validates the milestone list before any mutation: exactly one open
/// milestone must carry the expected title, so nothing can force-close the
/// wrong milestone.
pub fn finish_milestone(api: &dyn MilestoneApi, tag_name: &str) -> ShipyardResult<MilestoneInfo> {
  let open = api.list_open_milestones()?;
  let matching: Vec<&MilestoneInfo> = open.iter().filter(|m| m.title == NEXT_VERSION_TITLE).collect();

  let milestone = match matching.as_slice() {
    [] => {
      return Err(ShipyardError::Api(ApiError::MilestoneNotFound {
        title: NEXT_VERSION_TITLE.to_string(),
      }));
    }
    [one] => *one,
    many => {
      return Err(ShipyardError::Api(ApiError::MilestoneAmbiguous {
        title: NEXT_VERSION_TITLE.to_string(),
        count: many.len(),
      }));
    }
  };

  api.update_milestone(milestone.number, Some(tag_name), true)?;

  api.create_milestone(NEXT_VERSION_TITLE).with_context(|| {
    format!(
      "Milestone '{}' was renamed to '{}' and closed, but no fresh '{}' milestone could be created; \
       create it by hand",
      NEXT_VERSION_TITLE, tag_name, NEXT_VERSION_TITLE
    )
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;

  #[derive(Debug, Clone, PartialEq)]
  struct StoredMilestone {
    number: u64,
    title: String,
    open: bool,
  }

  struct MockApi {
    milestones: RefCell<Vec<StoredMilestone>>,
    fail_update: bool,
    fail_create: bool,
  }

  impl MockApi {
    fn with_titles(titles: &[&str]) -> Self {
      let milestones = titles
        .iter()
        .enumerate()
        .map(|(i, t)| StoredMilestone {
          number: i as u64 + 1,
          title: t.to_string(),
          open: true,
        })
        .collect();
      Self {
        milestones: RefCell::new(milestones),
        fail_update: false,
        fail_create: false,
      }
    }

    fn open_titled(&self, title: &str) -> usize {
      self
        .milestones
        .borrow()
        .iter()
        .filter(|m| m.open && m.title == title)
        .count()
    }

    fn closed_titled(&self, title: &str) -> usize {
      self
        .milestones
        .borrow()
        .iter()
        .filter(|m| !m.open && m.title == title)
        .count()
    }
  }

  impl MilestoneApi for MockApi {
    fn list_open_milestones(&self) -> ShipyardResult<Vec<MilestoneInfo>> {
      Ok(
        self
          .milestones
          .borrow()
          .iter()
          .filter(|m| m.open)
          .map(|m| MilestoneInfo {
            number: m.number,
            title: m.title.clone(),
          })
          .collect(),
      )
    }

    fn update_milestone(&self, number: u64, title: Option<&str>, close: bool) -> ShipyardResult<()> {
      if self.fail_update {
        return Err(ShipyardError::message("update rejected"));
      }
      let mut milestones = self.milestones.borrow_mut();
      let milestone = milestones
        .iter_mut()
        .find(|m| m.number == number)
        .ok_or_else(|| ShipyardError::message("no such milestone"))?;
      if let Some(title) = title {
        milestone.title = title.to_string();
      }
      if close {
        milestone.open = false;
      }
      Ok(())
    }

    fn create_milestone(&self, title: &str) -> ShipyardResult<MilestoneInfo> {
      if self.fail_create {
        return Err(ShipyardError::message("create rejected"));
      }
      let mut milestones = self.milestones.borrow_mut();
      let number = milestones.len() as u64 + 1;
      milestones.push(StoredMilestone {
        number,
        title: title.to_string(),
        open: true,
      });
      Ok(MilestoneInfo {
        number,
        title: title.to_string(),
      })
    }
  }

  #[test]
  fn test_rollover_end_state_invariant() {
    let api = MockApi::with_titles(&["Next Version", "unrelated"]);

    finish_milestone(&api, "v1.2.0").unwrap();

    assert_eq!(api.open_titled(NEXT_VERSION_TITLE), 1);
    assert_eq!(api.closed_titled("v1.2.0"), 1);
    assert_eq!(api.open_titled("unrelated"), 1);
  }

  #[test]
  fn test_rollover_fails_without_milestone() {
    let api = MockApi::with_titles(&["unrelated"]);

    let err = finish_milestone(&api, "v1.2.0").unwrap_err();
    assert!(err.to_string().contains("Next Version"));
    assert_eq!(api.open_titled("unrelated"), 1);
  }

  #[test]
  fn test_rollover_refuses_ambiguous_milestones() {
    let api = MockApi::with_titles(&["Next Version", "Next Version"]);

    let err = finish_milestone(&api, "v1.2.0").unwrap_err();
    assert!(err.to_string().contains("expected exactly one"));
    // neither copy was touched
    assert_eq!(api.open_titled(NEXT_VERSION_TITLE), 2);
  }

  #[test]
  fn test_failed_update_leaves_no_half_renamed_state() {
    let mut api = MockApi::with_titles(&["Next Version"]);
    api.fail_update = true;

    assert!(finish_milestone(&api, "v1.2.0").is_err());
    assert_eq!(api.open_titled(NEXT_VERSION_TITLE), 1);
    assert_eq!(api.closed_titled("v1.2.0"), 0);
  }

  #[test]
  fn test_failed_create_reports_manual_fix() {
    let mut api = MockApi::with_titles(&["Next Version"]);
    api.fail_create = true;

    let err = finish_milestone(&api, "v1.2.0").unwrap_err();
    assert!(err.to_string().contains("create it by hand"));
    // the close itself went through
    assert_eq!(api.closed_titled("v1.2.0"), 1);
    assert_eq!(api.open_titled(NEXT_VERSION_TITLE), 0);
  }
}
