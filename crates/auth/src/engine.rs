//! Ownership-based authorization engine.
//!
//! Every mutating request is checked here before any store is touched. The
//! decision function is pure: no IO, no clock, no panics. Handlers convert
//! the outcome into the domain error taxonomy via [`Decision::require`].

use adboard_core::{DomainError, DomainResult, UserId};

/// The identity a request runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// No credentials were presented.
    Anonymous,
    /// A verified account.
    User {
        id: UserId,
        /// Admins may modify any resource regardless of ownership.
        admin: bool,
    },
}

impl Actor {
    pub fn user(id: UserId) -> Self {
        Self::User { id, admin: false }
    }

    pub fn admin(id: UserId) -> Self {
        Self::User { id, admin: true }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::User { admin: true, .. })
    }

    /// The account id, if any.
    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }
}

/// What a request wants to do with an existing resource.
///
/// Update and delete are deliberately not distinguished: the ownership rule
/// treats every mutation identically. Creation is not an `Action` because
/// there is no resource to check ownership against yet; it is gated by
/// [`authorize_create`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
}

/// Ownership view of a resource under an authorization check.
pub trait Owned {
    fn owner(&self) -> UserId;
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The action needs an identity and none was presented.
    Unauthenticated,
    /// The caller is neither the resource owner nor an admin.
    NotOwner,
}

/// Authorization outcome. The engine never errors; denial is a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Convert the outcome into the domain error taxonomy.
    pub fn require(self) -> DomainResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Unauthenticated) => Err(DomainError::unauthenticated(
                "authentication credentials were not provided",
            )),
            Self::Deny(DenyReason::NotOwner) => Err(DomainError::permission_denied(
                "you do not have permission to perform this action",
            )),
        }
    }
}

/// Decide whether `actor` may apply `action` to `resource`.
///
/// The decision table:
///
/// | actor                  | read  | write (update/delete) |
/// |------------------------|-------|-----------------------|
/// | anonymous              | allow | deny                  |
/// | authenticated stranger | allow | deny                  |
/// | owner                  | allow | allow                 |
/// | admin                  | allow | allow                 |
///
/// The table is identical for every owned resource type; the resource only
/// participates through [`Owned::owner`].
///
/// - No IO
/// - No panics
/// - Same inputs always produce the same decision
pub fn authorize<R: Owned + ?Sized>(actor: &Actor, action: Action, resource: &R) -> Decision {
    match action {
        Action::Read => Decision::Allow,
        Action::Write => match actor {
            Actor::Anonymous => Decision::Deny(DenyReason::Unauthenticated),
            Actor::User { admin: true, .. } => Decision::Allow,
            Actor::User { id, .. } if *id == resource.owner() => Decision::Allow,
            Actor::User { .. } => Decision::Deny(DenyReason::NotOwner),
        },
    }
}

/// Decide whether `actor` may create a resource.
///
/// Creation requires only a verified identity: there is no entity to check
/// ownership against, and the surface stamps the caller as owner regardless
/// of any client-supplied author. This also covers creating items nested
/// under a resource owned by someone else (commenting on another account's
/// listing).
pub fn authorize_create(actor: &Actor) -> Decision {
    if actor.is_authenticated() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Listing {
        owner: UserId,
    }

    impl Owned for Listing {
        fn owner(&self) -> UserId {
            self.owner
        }
    }

    fn user_id(n: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(n))
    }

    fn listing_of(owner: UserId) -> Listing {
        Listing { owner }
    }

    #[test]
    fn anonymous_may_read() {
        let res = listing_of(user_id(1));
        assert_eq!(authorize(&Actor::Anonymous, Action::Read, &res), Decision::Allow);
    }

    #[test]
    fn anonymous_write_is_unauthenticated() {
        let res = listing_of(user_id(1));
        assert_eq!(
            authorize(&Actor::Anonymous, Action::Write, &res),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn anonymous_create_is_unauthenticated() {
        assert_eq!(
            authorize_create(&Actor::Anonymous),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn stranger_may_read_but_not_write() {
        let res = listing_of(user_id(1));
        let stranger = Actor::user(user_id(2));
        assert_eq!(authorize(&stranger, Action::Read, &res), Decision::Allow);
        assert_eq!(
            authorize(&stranger, Action::Write, &res),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn any_authenticated_actor_may_create() {
        // Commenting under another account's listing is a create, not a
        // write against the listing.
        assert_eq!(authorize_create(&Actor::user(user_id(2))), Decision::Allow);
        assert_eq!(authorize_create(&Actor::admin(user_id(3))), Decision::Allow);
    }

    #[test]
    fn owner_may_write_own_resource() {
        let owner = user_id(7);
        let res = listing_of(owner);
        assert_eq!(
            authorize(&Actor::user(owner), Action::Write, &res),
            Decision::Allow
        );
    }

    #[test]
    fn admin_may_write_foreign_resource() {
        let res = listing_of(user_id(1));
        assert_eq!(
            authorize(&Actor::admin(user_id(99)), Action::Write, &res),
            Decision::Allow
        );
    }

    #[test]
    fn require_maps_denials_onto_error_taxonomy() {
        let res = listing_of(user_id(1));

        let err = authorize(&Actor::Anonymous, Action::Write, &res)
            .require()
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));

        let err = authorize(&Actor::user(user_id(2)), Action::Write, &res)
            .require()
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        assert!(authorize(&Actor::admin(user_id(2)), Action::Write, &res)
            .require()
            .is_ok());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_user_id() -> impl Strategy<Value = UserId> {
            any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
        }

        fn any_actor() -> impl Strategy<Value = Actor> {
            prop_oneof![
                Just(Actor::Anonymous),
                any_user_id().prop_map(Actor::user),
                any_user_id().prop_map(Actor::admin),
            ]
        }

        fn any_action() -> impl Strategy<Value = Action> {
            prop_oneof![Just(Action::Read), Just(Action::Write)]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Reads are allowed for every actor, owner or not.
            #[test]
            fn reads_are_never_denied(actor in any_actor(), owner in any_user_id()) {
                let res = listing_of(owner);
                prop_assert_eq!(authorize(&actor, Action::Read, &res), Decision::Allow);
            }

            /// Anonymous callers can never write or create.
            #[test]
            fn anonymous_never_mutates(owner in any_user_id()) {
                let res = listing_of(owner);
                prop_assert_eq!(
                    authorize(&Actor::Anonymous, Action::Write, &res),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
                prop_assert_eq!(
                    authorize_create(&Actor::Anonymous),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }

            /// Admins are allowed every action on every resource.
            #[test]
            fn admins_are_always_allowed(
                id in any_user_id(),
                action in any_action(),
                owner in any_user_id(),
            ) {
                let res = listing_of(owner);
                prop_assert_eq!(authorize(&Actor::admin(id), action, &res), Decision::Allow);
            }

            /// Owners are allowed every action on their own resource.
            #[test]
            fn owners_are_always_allowed(id in any_user_id(), action in any_action()) {
                let res = listing_of(id);
                prop_assert_eq!(authorize(&Actor::user(id), action, &res), Decision::Allow);
            }

            /// A non-owner, non-admin caller can never write.
            #[test]
            fn strangers_never_write(id in any_user_id(), owner in any_user_id()) {
                prop_assume!(id != owner);
                let res = listing_of(owner);
                prop_assert_eq!(
                    authorize(&Actor::user(id), Action::Write, &res),
                    Decision::Deny(DenyReason::NotOwner)
                );
            }

            /// Any authenticated caller may create, whoever owns the
            /// surrounding resource.
            #[test]
            fn authenticated_callers_may_create(id in any_user_id()) {
                prop_assert_eq!(authorize_create(&Actor::user(id)), Decision::Allow);
                prop_assert_eq!(authorize_create(&Actor::admin(id)), Decision::Allow);
            }

            /// Same inputs, same decision.
            #[test]
            fn decisions_are_deterministic(
                actor in any_actor(),
                action in any_action(),
                owner in any_user_id(),
            ) {
                let res = listing_of(owner);
                prop_assert_eq!(
                    authorize(&actor, action, &res),
                    authorize(&actor, action, &res)
                );
            }
        }
    }
}
