use chrono::{DateTime, Utc};

use adboard_auth::Owned;
use adboard_core::{AdId, CommentId, DomainError, DomainResult, Entity, UserId};

/// A comment under a listing. Author and parent listing are fixed at
/// creation; a comment is only ever addressed through its parent's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub ad: AdId,
    pub author: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Client-suppliable creation fields. Author and parent come from the
/// surface, never from the client.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub text: Option<String>,
}

impl Comment {
    /// Create a comment by `author` under the listing `ad`.
    pub fn create(ad: AdId, author: UserId, input: NewComment) -> DomainResult<Self> {
        Ok(Self {
            id: CommentId::new(),
            ad,
            author,
            text: validate_text(&input.text)?,
            created_at: Utc::now(),
        })
    }

    pub fn apply_patch(&mut self, patch: CommentPatch) -> DomainResult<()> {
        if let Some(text) = patch.text {
            self.text = validate_text(&text)?;
        }
        Ok(())
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Owned for Comment {
    fn owner(&self) -> UserId {
        self.author
    }
}

fn validate_text(raw: &str) -> DomainResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text cannot be empty"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_text() {
        let comment = Comment::create(
            AdId::new(),
            UserId::new(),
            NewComment {
                text: "  looks great  ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(comment.text, "looks great");
    }

    #[test]
    fn create_rejects_blank_text() {
        let err = Comment::create(
            AdId::new(),
            UserId::new(),
            NewComment {
                text: "   ".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn owner_is_the_author() {
        let author = UserId::new();
        let comment = Comment::create(
            AdId::new(),
            author,
            NewComment {
                text: "still available?".to_string(),
            },
        )
        .unwrap();
        assert_eq!(comment.owner(), author);
    }

    #[test]
    fn patch_replaces_text() {
        let mut comment = Comment::create(
            AdId::new(),
            UserId::new(),
            NewComment {
                text: "first".to_string(),
            },
        )
        .unwrap();

        comment
            .apply_patch(CommentPatch {
                text: Some("edited".to_string()),
            })
            .unwrap();
        assert_eq!(comment.text, "edited");

        let err = comment
            .apply_patch(CommentPatch {
                text: Some("  ".to_string()),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(comment.text, "edited");
    }
}
