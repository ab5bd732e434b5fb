use crate::domain::{Container, ContainerRuntime, SelectionSet, ServiceId, ServiceState};
use crate::error::{Error, Result};
use crate::services::outcome::{Outcome, ServiceOutcome};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
    Remove,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Remove => "remove",
        };
        f.write_str(verb)
    }
}

/// List, start, stop, restart, remove and inspect logs of existing containers.
pub struct LifecycleController {
    runtime: Arc<dyn ContainerRuntime>,
}

impl LifecycleController {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Always a fresh runtime query.
    pub fn list(&self) -> Result<Vec<Container>> {
        self.runtime.check_available()?;
        self.runtime.list_containers()
    }

    /// Applies `action` to every selected container, continuing past
    /// individual failures. `Remove` is unconditional; confirming it is the
    /// caller's job.
    pub fn act(&self, action: Action, selection: &SelectionSet) -> Result<Vec<ServiceOutcome>> {
        self.runtime.check_available()?;

        let outcomes = selection
            .iter()
            .map(|identifier| {
                let outcome = self.act_one(action, identifier);
                if let Some(e) = outcome.error() {
                    error!("Failed to {action} {identifier}: {e}");
                }
                outcome
            })
            .collect();

        Ok(outcomes)
    }

    /// Last `lines` log lines of exactly one container.
    pub fn logs(&self, selection: &SelectionSet, lines: usize) -> Result<String> {
        let identifier = selection
            .single()
            .ok_or(Error::AmbiguousSelection(selection.len()))?;

        self.runtime.check_available()?;

        let name = container_name(identifier);
        let container = self.runtime.get_container(name)?;
        if container.state == ServiceState::Absent {
            return Err(Error::NotFound(identifier.to_string()));
        }

        self.runtime.container_logs(name, lines)
    }

    /// Catalog identifiers act on every container of the entry; the first
    /// member failure is reported after the remaining members were tried.
    fn act_one(&self, action: Action, identifier: &str) -> ServiceOutcome {
        let mut members = Vec::new();
        for name in member_names(identifier) {
            match self.runtime.get_container(name) {
                Ok(container) => members.push(container),
                Err(e) => return ServiceOutcome::failed(identifier, e),
            }
        }

        if members.iter().all(|c| c.state == ServiceState::Absent) {
            return ServiceOutcome::failed(identifier, Error::NotFound(identifier.to_string()));
        }

        let targets: Vec<&Container> = members
            .iter()
            .filter(|c| match action {
                Action::Start => c.state == ServiceState::Stopped,
                Action::Stop => c.state == ServiceState::Running,
                Action::Restart | Action::Remove => c.state != ServiceState::Absent,
            })
            .collect();

        let mut failure = None;
        for container in &targets {
            if let Err(e) = self.apply(action, &container.name) {
                error!("Failed to {action} {}: {e}", container.name);
                failure.get_or_insert(e);
            }
        }

        // Only install can create a missing member.
        let missing = members.iter().find(|c| c.state == ServiceState::Absent);
        if let (Action::Start, Some(missing)) = (action, missing) {
            failure.get_or_insert(Error::NotFound(missing.name.clone()));
        }

        let outcome = match (failure, action, targets.is_empty()) {
            (Some(e), _, _) => Outcome::Failed(e),
            (None, Action::Start, true) => {
                warn!("{identifier} is already running");
                Outcome::AlreadyRunning
            }
            (None, Action::Stop, true) => {
                warn!("{identifier} is already stopped");
                Outcome::AlreadyStopped
            }
            (None, Action::Start, false) => Outcome::Started,
            (None, Action::Stop, false) => Outcome::Stopped,
            (None, Action::Restart, _) => Outcome::Restarted,
            (None, Action::Remove, _) => Outcome::Removed,
        };

        ServiceOutcome::new(identifier, outcome)
    }

    fn apply(&self, action: Action, name: &str) -> Result<()> {
        match action {
            Action::Start => {
                info!("Starting {name}...");
                self.runtime.start_container(name)
            }
            Action::Stop => {
                info!("Stopping {name}...");
                self.runtime.stop_container(name)
            }
            Action::Restart => {
                info!("Restarting {name}...");
                self.runtime.restart_container(name)
            }
            Action::Remove => {
                info!("Removing {name}...");
                self.runtime.remove_container(name)
            }
        }
    }
}

/// Logs target: catalog identifiers map to their primary container;
/// anything else is taken as a raw container name.
fn container_name(identifier: &str) -> &str {
    identifier
        .parse::<ServiceId>()
        .map(|id| id.definition().container)
        .unwrap_or(identifier)
}

fn member_names(identifier: &str) -> Vec<&str> {
    match identifier.parse::<ServiceId>() {
        Ok(id) => id.definition().containers.to_vec(),
        Err(_) => vec![identifier],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::outcome::any_failed;
    use crate::test_support::MockRuntime;

    fn create_test_controller() -> (LifecycleController, Arc<MockRuntime>) {
        let mock = Arc::new(MockRuntime::new());
        let controller = LifecycleController::new(mock.clone());
        (controller, mock)
    }

    fn selection(items: &[&str]) -> SelectionSet {
        items.iter().copied().collect()
    }

    #[test]
    fn list_reports_every_known_container() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Running);
        mock.add_container("wikijs-db", ServiceState::Stopped);

        let containers = controller.list().unwrap();

        assert_eq!(containers.len(), 2);
        assert!(
            containers
                .iter()
                .any(|c| c.name == "pihole" && c.state == ServiceState::Running)
        );
        assert!(mock.get_commands().contains(&"list_containers".to_string()));
    }

    #[test]
    fn list_is_never_cached() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Running);
        controller.list().unwrap();

        mock.add_container("pihole", ServiceState::Stopped);
        let containers = controller.list().unwrap();

        assert_eq!(containers[0].state, ServiceState::Stopped);
        assert_eq!(mock.count_commands("list_containers"), 2);
    }

    #[test]
    fn stop_all_stops_running_and_skips_stopped() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Running);
        mock.add_container("portainer", ServiceState::Stopped);

        let outcomes = controller
            .act(Action::Stop, &selection(&["pihole", "portainer"]))
            .unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Stopped));
        assert!(matches!(outcomes[1].outcome, Outcome::AlreadyStopped));
        assert_eq!(mock.get_state("pihole"), Some(ServiceState::Stopped));
        assert!(!mock.get_commands().contains(&"stop:portainer".to_string()));
    }

    #[test]
    fn start_fans_out_to_stopped_members_of_catalog_entry() {
        let (controller, mock) = create_test_controller();
        mock.add_container("monitoring-grafana", ServiceState::Stopped);
        mock.add_container("monitoring-prometheus", ServiceState::Stopped);
        mock.add_container("monitoring-node-exporter", ServiceState::Running);

        let outcomes = controller
            .act(Action::Start, &selection(&["monitoring"]))
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].outcome, Outcome::Started));
        assert_eq!(outcomes[0].service, "monitoring");
        assert_eq!(
            mock.get_state("monitoring-prometheus"),
            Some(ServiceState::Running)
        );
        assert!(
            !mock
                .get_commands()
                .contains(&"start:monitoring-node-exporter".to_string())
        );
    }

    #[test]
    fn stop_catalog_entry_stops_whole_stack() {
        let (controller, mock) = create_test_controller();
        for name in ServiceId::Monitoring.definition().containers {
            mock.add_container(name, ServiceState::Running);
        }

        let outcomes = controller
            .act(Action::Stop, &selection(&["monitoring"]))
            .unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Stopped));
        for name in ServiceId::Monitoring.definition().containers {
            assert_eq!(mock.get_state(name), Some(ServiceState::Stopped), "{name}");
        }
    }

    #[test]
    fn remove_catalog_entry_removes_its_database() {
        let (controller, mock) = create_test_controller();
        mock.add_container("wikijs", ServiceState::Running);
        mock.add_container("wikijs-db", ServiceState::Running);

        let outcomes = controller
            .act(Action::Remove, &selection(&["wikijs"]))
            .unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Removed));
        assert_eq!(mock.get_state("wikijs"), None);
        assert_eq!(mock.get_state("wikijs-db"), None);
    }

    #[test]
    fn member_failure_fails_identifier_but_other_members_still_act() {
        let (controller, mock) = create_test_controller();
        mock.add_container("passbolt", ServiceState::Running);
        mock.add_container("passbolt-db", ServiceState::Running);
        mock.set_fail_on("stop:passbolt");

        let outcomes = controller
            .act(Action::Stop, &selection(&["passbolt"]))
            .unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::ExternalCommandFailure { .. })
        ));
        assert_eq!(mock.get_state("passbolt-db"), Some(ServiceState::Stopped));
    }

    #[test]
    fn start_with_absent_member_fails_naming_it() {
        let (controller, mock) = create_test_controller();
        mock.add_container("wikijs", ServiceState::Stopped);

        let outcomes = controller
            .act(Action::Start, &selection(&["wikijs"]))
            .unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::NotFound(ref name)) if name == "wikijs-db"
        ));
        assert_eq!(mock.get_state("wikijs"), Some(ServiceState::Running));
    }

    #[test]
    fn unknown_container_fails_alone() {
        let (controller, mock) = create_test_controller();
        mock.add_container("adguard", ServiceState::Running);

        let outcomes = controller
            .act(Action::Restart, &selection(&["ghost", "adguard"]))
            .unwrap();

        assert!(matches!(
            outcomes[0].outcome,
            Outcome::Failed(Error::NotFound(_))
        ));
        assert!(matches!(outcomes[1].outcome, Outcome::Restarted));
        assert!(any_failed(&outcomes));
    }

    #[test]
    fn runtime_failure_on_one_container_continues_batch() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Stopped);
        mock.add_container("adguard", ServiceState::Stopped);
        mock.set_fail_on("start:pihole");

        let outcomes = controller
            .act(Action::Start, &selection(&["pihole", "adguard"]))
            .unwrap();

        assert!(outcomes[0].is_failure());
        assert!(matches!(outcomes[1].outcome, Outcome::Started));
        assert_eq!(mock.get_state("adguard"), Some(ServiceState::Running));
    }

    #[test]
    fn remove_acts_unconditionally() {
        let (controller, mock) = create_test_controller();
        mock.add_container("uptime-kuma", ServiceState::Running);

        let outcomes = controller
            .act(Action::Remove, &selection(&["uptime-kuma"]))
            .unwrap();

        assert!(matches!(outcomes[0].outcome, Outcome::Removed));
        assert_eq!(mock.get_state("uptime-kuma"), None);
    }

    #[test]
    fn logs_reject_multiple_targets_without_touching_runtime() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Running);
        mock.add_container("adguard", ServiceState::Running);

        let err = controller
            .logs(&selection(&["pihole", "adguard"]), 50)
            .unwrap_err();

        assert!(matches!(err, Error::AmbiguousSelection(2)));
        assert!(mock.get_commands().is_empty());
    }

    #[test]
    fn logs_return_requested_lines() {
        let (controller, mock) = create_test_controller();
        mock.add_container("pihole", ServiceState::Running);

        let text = controller.logs(&selection(&["pihole"]), 20).unwrap();

        assert!(text.contains("pihole"));
        assert!(mock.get_commands().contains(&"logs:pihole:20".to_string()));
    }

    #[test]
    fn logs_of_missing_container_is_not_found() {
        let (controller, _mock) = create_test_controller();

        let err = controller.logs(&selection(&["wikijs"]), 10).unwrap_err();

        assert!(matches!(err, Error::NotFound(ref s) if s == "wikijs"));
    }

    #[test]
    fn unavailable_runtime_is_fatal() {
        let (controller, mock) = create_test_controller();
        mock.set_unavailable();

        assert!(matches!(
            controller.act(Action::Stop, &selection(&["pihole"])),
            Err(Error::RuntimeUnavailable(_))
        ));
        assert!(matches!(
            controller.list(),
            Err(Error::RuntimeUnavailable(_))
        ));
    }
}
