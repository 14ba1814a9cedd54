//! Workspace provisioning: project, backing user, and membership.
//!
//! The three steps always run, in order, regardless of how the previous one
//! went. There is no rollback; a partially provisioned workspace is visible in
//! the per-step outcomes of [`ProvisionReport`] and in the logs.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    slugify, NewMembership, NewProject, NewUser, ProjectIdentifier, TrackerClient,
    TrackerResponse, TransportError, UserLogin, LIMITED_ROLE_ID,
};

/// Number of random bytes in a generated password (hex-encoded to twice that).
const PASSWORD_BYTES: usize = 8;

/// One provisioning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStep {
    /// `POST /projects.json`.
    CreateProject,
    /// `POST /users.json`.
    CreateUser,
    /// `POST /projects/{id}/memberships.json`.
    GrantMembership,
}

impl std::fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateProject => "create_project",
            Self::CreateUser => "create_user",
            Self::GrantMembership => "grant_membership",
        };
        f.write_str(s)
    }
}

/// Result of one provisioning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Which request this is.
    pub step: ProvisionStep,
    /// HTTP status returned by the tracker.
    pub status: u16,
    /// Response body, kept only when the tracker rejected the request.
    pub rejection: Option<String>,
}

impl StepOutcome {
    fn from_response(step: ProvisionStep, response: TrackerResponse) -> Self {
        let rejection = (!response.is_created()).then_some(response.body);
        Self {
            step,
            status: response.status,
            rejection,
        }
    }

    /// `true` when the tracker answered `201 Created`.
    pub fn is_created(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Everything provisioning attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Identifier the project was created under.
    pub project_identifier: ProjectIdentifier,
    /// Login the user was created with.
    pub user_login: UserLogin,
    /// One entry per step, in execution order.
    pub steps: Vec<StepOutcome>,
}

impl ProvisionReport {
    /// `true` when every step returned `201 Created`.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_created)
    }
}

/// Generates a one-time password: random bytes from the thread-local CSPRNG,
/// hex-encoded. The value is sent once and then dropped.
pub fn one_time_password() -> String {
    let bytes: [u8; PASSWORD_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Creates the training project, the student user, and the membership.
pub struct WorkspaceProvisioner<'a> {
    client: &'a dyn TrackerClient,
}

impl<'a> WorkspaceProvisioner<'a> {
    /// Creates a provisioner over `client`.
    pub fn new(client: &'a dyn TrackerClient) -> Self {
        Self { client }
    }

    /// Builds the project request for `project_name`.
    pub fn project_request(project_name: &str) -> NewProject {
        NewProject {
            name: project_name.to_string(),
            identifier: ProjectIdentifier::from_display_name(project_name),
            description: format!("Project for {project_name}"),
            is_public: false,
        }
    }

    /// Builds the user request for `student_name` with a fresh password.
    pub fn user_request(student_name: &str) -> NewUser {
        NewUser {
            mail: format!("{}@example.com", slugify(student_name)),
            login: UserLogin::from_display_name(student_name),
            firstname: student_name.to_string(),
            lastname: "User".to_string(),
            password: one_time_password(),
        }
    }

    /// Runs the three provisioning steps.
    ///
    /// Names are not validated here: an empty name produces a request the
    /// tracker rejects, and that rejection is recorded like any other. A
    /// rejected step never stops the following ones; only a transport failure
    /// ends provisioning early. The password is never logged or returned.
    #[instrument(name = "provision", skip(self))]
    pub async fn provision(
        &self,
        project_name: &str,
        student_name: &str,
    ) -> Result<ProvisionReport, TransportError> {
        if project_name.is_empty() || student_name.is_empty() {
            warn!("Empty project or student name; the tracker will reject provisioning");
        }
        let project = Self::project_request(project_name);
        let user = Self::user_request(student_name);
        let membership = NewMembership {
            login: user.login.clone(),
            role_ids: vec![LIMITED_ROLE_ID],
        };

        let mut steps = Vec::with_capacity(3);

        let response = self.client.post("/projects.json", &project.payload()).await?;
        steps.push(log_step(
            StepOutcome::from_response(ProvisionStep::CreateProject, response),
            project_name,
        ));

        let response = self.client.post("/users.json", &user.payload()).await?;
        steps.push(log_step(
            StepOutcome::from_response(ProvisionStep::CreateUser, response),
            project_name,
        ));

        let response = self
            .client
            .post(
                &format!("/projects/{}/memberships.json", project.identifier),
                &membership.payload(),
            )
            .await?;
        steps.push(log_step(
            StepOutcome::from_response(ProvisionStep::GrantMembership, response),
            project_name,
        ));

        Ok(ProvisionReport {
            project_identifier: project.identifier,
            user_login: user.login,
            steps,
        })
    }
}

fn log_step(outcome: StepOutcome, project_name: &str) -> StepOutcome {
    match &outcome.rejection {
        None => info!(step = %outcome.step, project = project_name, "Provisioning step succeeded"),
        Some(body) => warn!(
            step = %outcome.step,
            project = project_name,
            status = outcome.status,
            body = %body,
            "Provisioning step failed"
        ),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_time_password_is_sixteen_hex_chars_and_fresh() {
        let first = one_time_password();
        let second = one_time_password();
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_project_request_derives_identifier_and_is_private() {
        let project = WorkspaceProvisioner::project_request("Formazione - Student1");
        assert_eq!(project.identifier.as_str(), "formazione_-_student1");
        assert_eq!(project.description, "Project for Formazione - Student1");
        assert!(!project.is_public);
    }

    #[test]
    fn test_user_request_fields() {
        let user = WorkspaceProvisioner::user_request("Mario Rossi");
        assert_eq!(user.login.as_str(), "mario_rossi");
        assert_eq!(user.firstname, "Mario Rossi");
        assert_eq!(user.lastname, "User");
        assert_eq!(user.mail, "mario_rossi@example.com");
    }

    #[test]
    fn test_empty_names_still_build_requests() {
        let project = WorkspaceProvisioner::project_request("");
        assert_eq!(project.identifier.as_str(), "");
        assert_eq!(project.description, "Project for ");

        let user = WorkspaceProvisioner::user_request("");
        assert_eq!(user.login.as_str(), "");
        assert_eq!(user.mail, "@example.com");
    }
}
