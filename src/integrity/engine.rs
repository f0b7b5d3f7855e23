use futures::future;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use super::error::IntegrityError;
use super::registry::{self, Cardinality, DeletePolicy, Relation, RELATIONS};
use super::Record;
use crate::store;

/// Existence validation on write and dependent counting on delete.
///
/// The engine is read-only: it issues queries and never mutates the store.
/// A caller that checks and then writes is not atomic with respect to other
/// requests, so a dependent inserted between [`check_deletable`] and the
/// delete can be left dangling.
///
/// [`check_deletable`]: IntegrityEngine::check_deletable
pub struct IntegrityEngine<'a, C> {
    db: &'a C,
    relations: &'a [Relation],
}

impl<'a, C: ConnectionTrait> IntegrityEngine<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self::with_relations(db, RELATIONS)
    }

    pub fn with_relations(db: &'a C, relations: &'a [Relation]) -> Self {
        Self { db, relations }
    }

    /// Check every required scalar reference of a new record.
    ///
    /// # Errors
    ///
    /// Fails on the first unresolved reference in registry order.
    pub async fn validate_references<R: Record>(&self, candidate: &R) -> Result<(), IntegrityError> {
        for relation in registry::outgoing(self.relations, R::KIND).filter(|r| r.is_required_one()) {
            let id = candidate
                .reference(relation.field)
                .ok_or(IntegrityError::UnsetReference {
                    field: relation.field,
                })?;
            self.ensure_exists(relation, id).await?;
        }
        Ok(())
    }

    /// Check only the scalar references a patch actually sets.
    ///
    /// # Errors
    ///
    /// Fails on the first unresolved reference in registry order.
    pub async fn validate_changed_references<R: Record>(
        &self,
        patch: &R,
    ) -> Result<(), IntegrityError> {
        for relation in registry::outgoing(self.relations, R::KIND)
            .filter(|r| r.cardinality == Cardinality::One)
        {
            if let Some(id) = patch.reference(relation.field) {
                self.ensure_exists(relation, id).await?;
            }
        }
        Ok(())
    }

    /// Check that the stored `record` identified by `id` may be removed.
    ///
    /// Self-guards are evaluated first since they need no queries. Dependent
    /// counts for all restricting edges are then gathered concurrently and
    /// the first non-zero one in registry order is reported.
    ///
    /// # Errors
    ///
    /// `ListNotEmpty` or `DependentsExist` when something still depends on
    /// the record, `Store` when a count query fails.
    pub async fn check_deletable<R: Record>(&self, id: Uuid, record: &R) -> Result<(), IntegrityError> {
        for relation in registry::outgoing(self.relations, R::KIND)
            .filter(|r| r.on_delete == DeletePolicy::SelfGuard)
        {
            let len = record.reference_list(relation.field).map_or(0, <[Uuid]>::len);
            if len > 0 {
                return Err(IntegrityError::ListNotEmpty {
                    field: relation.field,
                    len,
                });
            }
        }

        let restricting: Vec<&Relation> = registry::incoming(self.relations, R::KIND)
            .filter(|r| r.on_delete == DeletePolicy::Restrict)
            .collect();

        let counts = future::try_join_all(
            restricting
                .iter()
                .map(|r| store::count_referencing(self.db, r.source, r.column, id)),
        )
        .await?;

        tracing::debug!(kind = %R::KIND, %id, ?counts, "dependent counts");

        match restricting.iter().zip(counts).find(|(_, count)| *count > 0) {
            Some((relation, count)) => Err(IntegrityError::DependentsExist {
                dependent: relation.source,
                field: relation.field,
                count,
            }),
            None => Ok(()),
        }
    }

    async fn ensure_exists(&self, relation: &Relation, id: Uuid) -> Result<(), IntegrityError> {
        if store::exists(self.db, relation.target, id).await? {
            Ok(())
        } else {
            Err(IntegrityError::MissingReference {
                field: relation.field,
                target: relation.target,
                id,
            })
        }
    }
}
