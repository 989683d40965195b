//! Star-rating widget state: a hover preview layered over a committed value.

pub const MAX_STARS: u8 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RatingState {
    /// 0 means no rating chosen yet.
    pub committed: u8,
    pub hovered: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatingEvent {
    Hover(u8),
    Unhover,
    Select(u8),
    Reset,
}

/// Owns the rating state. Every event is valid in every state.
#[derive(Clone, Debug, Default)]
pub struct RatingInput {
    state: RatingState,
}

impl RatingInput {
    pub fn apply(&mut self, event: RatingEvent) {
        match event {
            RatingEvent::Hover(n) => self.state.hovered = Some(clamp_star(n)),
            RatingEvent::Unhover => self.state.hovered = None,
            RatingEvent::Select(n) => self.state.committed = clamp_star(n),
            RatingEvent::Reset => self.state = RatingState::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> RatingState {
        self.state
    }

    pub fn committed(&self) -> u8 {
        self.state.committed
    }

    /// Stars `1..=active_stars()` are drawn highlighted.
    pub fn active_stars(&self) -> u8 {
        self.state.hovered.unwrap_or(self.state.committed)
    }

    pub fn is_active(&self, star: u8) -> bool {
        star >= 1 && star <= self.active_stars()
    }
}

fn clamp_star(n: u8) -> u8 {
    n.clamp(1, MAX_STARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_previews_without_committing() {
        let mut rating = RatingInput::default();
        rating.apply(RatingEvent::Select(2));
        rating.apply(RatingEvent::Hover(4));

        assert_eq!(rating.committed(), 2);
        assert_eq!(rating.active_stars(), 4);
        assert!(rating.is_active(4));
        assert!(!rating.is_active(5));

        rating.apply(RatingEvent::Unhover);
        assert_eq!(rating.active_stars(), 2);
    }

    #[test]
    fn select_commits_and_repeats_are_idempotent() {
        let mut rating = RatingInput::default();
        rating.apply(RatingEvent::Select(5));
        let once = rating.state();
        rating.apply(RatingEvent::Select(5));
        assert_eq!(rating.state(), once);
        assert_eq!(rating.committed(), 5);
    }

    #[test]
    fn reset_clears_both_fields() {
        let mut rating = RatingInput::default();
        rating.apply(RatingEvent::Select(3));
        rating.apply(RatingEvent::Hover(1));
        rating.apply(RatingEvent::Reset);
        assert_eq!(rating.state(), RatingState { committed: 0, hovered: None });
        rating.apply(RatingEvent::Reset);
        assert_eq!(rating.state(), RatingState::default());
    }

    #[test]
    fn out_of_range_stars_are_clamped() {
        let mut rating = RatingInput::default();
        rating.apply(RatingEvent::Select(9));
        assert_eq!(rating.committed(), 5);
        rating.apply(RatingEvent::Hover(0));
        assert_eq!(rating.active_stars(), 1);
        assert!(!rating.is_active(0));
    }
}
