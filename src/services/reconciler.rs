use crate::domain::{ContainerRuntime, SelectionSet, ServiceId, ServiceState};
use crate::error::Result;
use crate::services::outcome::{Outcome, ServiceOutcome};
use crate::services::resolver::CatalogResolver;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Brings selected catalog services up, acting only on those not running.
pub struct Reconciler {
    runtime: Arc<dyn ContainerRuntime>,
    resolver: Arc<CatalogResolver>,
}

impl Reconciler {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, resolver: Arc<CatalogResolver>) -> Self {
        Self { runtime, resolver }
    }

    /// Processes the selection strictly in order. Per-service failures are
    /// reported in the returned outcomes; only an unreachable runtime aborts.
    pub fn apply(&self, selection: &SelectionSet) -> Result<Vec<ServiceOutcome>> {
        self.runtime.check_available()?;

        if selection.is_empty() {
            return Ok(Vec::new());
        }

        info!("Reconciling {} service(s)...", selection.len());

        let outcomes: Vec<ServiceOutcome> = selection
            .iter()
            .map(|identifier| {
                let outcome = self.apply_one(identifier);
                match &outcome.outcome {
                    Outcome::Failed(e) => error!("{identifier}: {e}"),
                    other => debug!("{identifier}: {other:?}"),
                }
                outcome
            })
            .collect();

        Ok(outcomes)
    }

    fn apply_one(&self, identifier: &str) -> ServiceOutcome {
        let id: ServiceId = match identifier.parse() {
            Ok(id) => id,
            Err(e) => return ServiceOutcome::failed(identifier, e),
        };
        let name = id.as_str();

        // Fresh query: state may have changed since the operator chose.
        match self.all_running(id) {
            Ok(true) => {
                info!("{name} is already running");
                return ServiceOutcome::new(name, Outcome::AlreadyRunning);
            }
            Ok(false) => {}
            Err(e) => return ServiceOutcome::failed(name, e),
        }

        let manifest = match self.resolver.resolve_service(id) {
            Ok(manifest) => manifest,
            Err(e) => return ServiceOutcome::failed(name, e),
        };

        info!("Bringing up {name} from {:?}", manifest.path);
        match self.runtime.compose_up(&manifest.path) {
            Ok(()) => ServiceOutcome::new(name, Outcome::Started),
            Err(e) => ServiceOutcome::failed(name, e),
        }
    }

    /// A partially running stack counts as down.
    fn all_running(&self, id: ServiceId) -> Result<bool> {
        for member in id.definition().containers {
            let container = self.runtime.get_container(member)?;
            if container.state != ServiceState::Running {
                debug!("{id}: {member} is {}", container.state);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HostParams, SecretPolicy};
    use crate::error::Error;
    use crate::infra::ServiceLayout;
    use crate::services::outcome::any_failed;
    use crate::test_support::{FakeIssuer, MockRuntime};
    use tempfile::TempDir;

    fn create_test_reconciler() -> (Reconciler, Arc<MockRuntime>, Arc<CatalogResolver>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockRuntime::new());
        let resolver = Arc::new(CatalogResolver::new(
            ServiceLayout::new(dir.path(), None),
            HostParams {
                ip: "10.0.0.5".into(),
                timezone: "Etc/UTC".into(),
            },
            SecretPolicy::default(),
            Arc::new(FakeIssuer::new()),
        ));
        let reconciler = Reconciler::new(mock.clone(), resolver.clone());
        (reconciler, mock, resolver, dir)
    }

    fn selection(items: &[&str]) -> SelectionSet {
        items.iter().copied().collect()
    }

    #[test]
    fn starts_missing_service() {
        let (reconciler, mock, resolver, _dir) = create_test_reconciler();

        let outcomes = reconciler.apply(&selection(&["pihole"])).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].outcome, Outcome::Started));
        assert!(resolver.layout().is_installed(ServiceId::Pihole));
        assert_eq!(mock.get_state("pihole"), Some(ServiceState::Running));
    }

    #[test]
    fn running_service_is_not_brought_up_again() {
        let (reconciler, mock, resolver, _dir) = create_test_reconciler();
        mock.add_container("pihole", ServiceState::Running);

        let outcomes = reconciler.apply(&selection(&["pihole"])).unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::AlreadyRunning));
        assert_eq!(mock.count_commands("compose_up"), 0);
        assert!(!resolver.layout().is_installed(ServiceId::Pihole));
    }

    #[test]
    fn missing_database_brings_the_stack_up_again() {
        let (reconciler, mock, _resolver, _dir) = create_test_reconciler();
        mock.add_container("wikijs", ServiceState::Running);

        let outcomes = reconciler.apply(&selection(&["wikijs"])).unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Started));
        assert_eq!(mock.count_commands("compose_up"), 1);
        assert_eq!(mock.get_state("wikijs-db"), Some(ServiceState::Running));
    }

    #[test]
    fn stopped_member_counts_as_not_running() {
        let (reconciler, mock, _resolver, _dir) = create_test_reconciler();
        mock.add_container("monitoring-grafana", ServiceState::Running);
        mock.add_container("monitoring-prometheus", ServiceState::Running);
        mock.add_container("monitoring-node-exporter", ServiceState::Stopped);

        let outcomes = reconciler.apply(&selection(&["monitoring"])).unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Started));
        assert_eq!(
            mock.get_state("monitoring-node-exporter"),
            Some(ServiceState::Running)
        );
    }

    #[test]
    fn inspect_failure_fails_without_bring_up() {
        let (reconciler, mock, resolver, _dir) = create_test_reconciler();
        mock.set_fail_on("get_container:passbolt-db");
        mock.add_container("passbolt", ServiceState::Running);

        let outcomes = reconciler.apply(&selection(&["passbolt"])).unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::ExternalCommandFailure { .. })
        ));
        assert_eq!(mock.count_commands("compose_up"), 0);
        assert!(!resolver.layout().is_installed(ServiceId::Passbolt));
    }

    #[test]
    fn apply_twice_is_idempotent() {
        let (reconciler, mock, _resolver, _dir) = create_test_reconciler();
        let wanted = selection(&["wikijs", "uptime-kuma"]);

        reconciler.apply(&wanted).unwrap();
        let ups_after_first = mock.count_commands("compose_up");
        let second = reconciler.apply(&wanted).unwrap();

        assert_eq!(ups_after_first, 2);
        assert!(
            second
                .iter()
                .all(|o| matches!(o.outcome, Outcome::AlreadyRunning))
        );
        assert_eq!(mock.count_commands("compose_up"), 2);
    }

    #[test]
    fn stopped_service_is_brought_up_with_existing_manifest() {
        let (reconciler, mock, resolver, _dir) = create_test_reconciler();
        let first = resolver.resolve("pihole").unwrap();
        mock.add_container("pihole", ServiceState::Stopped);

        let outcomes = reconciler.apply(&selection(&["pihole"])).unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Started));
        let second = resolver.resolve("pihole").unwrap();
        assert_eq!(first.contents, second.contents);
    }

    #[test]
    fn failure_on_one_service_does_not_stop_the_batch() {
        let (reconciler, mock, _resolver, _dir) = create_test_reconciler();
        mock.set_fail_on("compose_up:pihole");

        let outcomes = reconciler.apply(&selection(&["pihole", "adguard"])).unwrap();

        assert_eq!(outcomes[0].service, "pihole");
        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::ExternalCommandFailure { .. })
        ));
        assert_eq!(outcomes[1].service, "adguard");
        assert!(matches!(outcomes[1].outcome, Outcome::Started));
        assert!(any_failed(&outcomes));
    }

    #[test]
    fn unknown_identifier_fails_alone() {
        let (reconciler, _mock, _resolver, _dir) = create_test_reconciler();

        let outcomes = reconciler
            .apply(&selection(&["not-a-real-service", "portainer"]))
            .unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::UnknownService(_))
        ));
        assert!(matches!(outcomes[1].outcome, Outcome::Started));
    }

    #[test]
    fn unavailable_runtime_aborts_before_resolution() {
        let (reconciler, mock, resolver, _dir) = create_test_reconciler();
        mock.set_unavailable();

        let err = reconciler.apply(&selection(&["pihole"])).unwrap_err();

        assert!(matches!(err, Error::RuntimeUnavailable(_)));
        assert!(!resolver.layout().is_installed(ServiceId::Pihole));
        assert!(
            !resolver
                .layout()
                .credentials_path(ServiceId::Pihole)
                .exists()
        );
    }

    #[test]
    fn services_are_processed_in_selection_order() {
        let (reconciler, mock, _resolver, _dir) = create_test_reconciler();

        reconciler
            .apply(&selection(&["wikijs", "portainer", "adguard"]))
            .unwrap();

        let ups: Vec<String> = mock
            .get_commands()
            .into_iter()
            .filter(|c| c.starts_with("compose_up:"))
            .collect();
        assert_eq!(
            ups,
            vec!["compose_up:wikijs", "compose_up:portainer", "compose_up:adguard"]
        );
    }
}
