pub mod rating;
pub mod submit;

use rating::{RatingEvent, RatingInput};
use submit::SubmissionOutcome;

use crate::error::SubmissionError;

/// Values read from the form at submit time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub email: String,
    pub feedback: String,
    pub rating: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Feedback,
    Rating,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Feedback,
            FormField::Feedback => FormField::Rating,
            FormField::Rating => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Rating,
            FormField::Email => FormField::Name,
            FormField::Feedback => FormField::Email,
            FormField::Rating => FormField::Feedback,
        }
    }
}

/// Editable state of the feedback form.
#[derive(Debug)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub feedback: String,
    pub rating: RatingInput,
    pub focus: FormField,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            feedback: String::new(),
            rating: RatingInput::default(),
            focus: FormField::Feedback,
        }
    }
}

impl FeedbackForm {
    pub fn input(&self) -> FormInput {
        FormInput {
            name: self.name.clone(),
            email: self.email.clone(),
            feedback: self.feedback.clone(),
            rating: self.rating.committed(),
        }
    }

    pub fn type_char(&mut self, c: char) {
        match self.focus {
            FormField::Name => self.name.push(c),
            FormField::Email => self.email.push(c),
            FormField::Feedback => self.feedback.push(c),
            FormField::Rating => {
                if let Some(n) = c.to_digit(10).filter(|n| (1..=5).contains(n)) {
                    self.rating.apply(RatingEvent::Select(n as u8));
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Email => {
                self.email.pop();
            }
            FormField::Feedback => {
                self.feedback.pop();
            }
            FormField::Rating => self.rating.apply(RatingEvent::Reset),
        }
    }

    /// Step the committed rating by `delta`, staying within 1..=5.
    pub fn nudge_rating(&mut self, delta: i8) {
        let next = (self.rating.committed() as i8 + delta).clamp(1, rating::MAX_STARS as i8);
        self.rating.apply(RatingEvent::Select(next as u8));
    }

    /// Apply a finished submission: only an accepted one clears the text and
    /// resets the rating, so failed input stays for a retry. Text edited while
    /// the write was pending is not the submitted text and is kept.
    pub fn on_submitted(&mut self, submitted: &FormInput, result: &Result<SubmissionOutcome, SubmissionError>) {
        if result.is_ok() {
            self.rating.apply(RatingEvent::Reset);
            if self.feedback == submitted.feedback {
                self.feedback.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> SubmissionOutcome {
        SubmissionOutcome {
            sentiment: "positive".into(),
            emotion: "joy".into(),
            keywords: Vec::new(),
        }
    }

    fn filled() -> FeedbackForm {
        let mut form = FeedbackForm::default();
        for c in "Nice".chars() {
            form.type_char(c);
        }
        form.focus = FormField::Rating;
        form.type_char('4');
        form
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let form = filled();
        assert_eq!(
            form.input(),
            FormInput { feedback: "Nice".into(), rating: 4, ..FormInput::default() }
        );
    }

    #[test]
    fn rating_field_ignores_non_star_keys() {
        let mut form = filled();
        form.type_char('9');
        form.type_char('x');
        assert_eq!(form.rating.committed(), 4);
        form.nudge_rating(3);
        assert_eq!(form.rating.committed(), 5);
        form.nudge_rating(-9);
        assert_eq!(form.rating.committed(), 1);
    }

    #[test]
    fn success_resets_rating_and_text_but_failure_keeps_them() {
        let mut form = filled();
        let sent = form.input();
        form.on_submitted(&sent, &Err(SubmissionError::Network("down".into())));
        assert_eq!(form.rating.committed(), 4);
        assert_eq!(form.feedback, "Nice");

        form.on_submitted(&sent, &Ok(accepted()));
        assert_eq!(form.rating.committed(), 0);
        assert!(form.feedback.is_empty());
    }

    #[test]
    fn text_typed_while_the_write_was_pending_survives_success() {
        let mut form = filled();
        let sent = form.input();
        form.focus = FormField::Feedback;
        for c in " and quick".chars() {
            form.type_char(c);
        }

        form.on_submitted(&sent, &Ok(accepted()));
        assert_eq!(form.feedback, "Nice and quick");
        assert_eq!(form.rating.committed(), 0);
    }

    #[test]
    fn focus_cycles_through_every_field() {
        let mut field = FormField::Name;
        for _ in 0..4 {
            field = field.next();
        }
        assert_eq!(field, FormField::Name);
        assert_eq!(FormField::Name.prev(), FormField::Rating);
    }
}
