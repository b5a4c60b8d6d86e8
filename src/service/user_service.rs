use async_trait::async_trait;
use bson::oid::ObjectId;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::SeedConfig;
use crate::dto::auth_dto::{
    ActivityEntryResponse, AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    SetupAdminResponse, UpdateProfileRequest, UserResponse,
};
use crate::model::activity::ActivityEntry;
use crate::model::user::{Role, User};
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

const ACTIVITY_LOG_LIMIT: i64 = 50;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError>;
    async fn get_profile(&self, user_id: &ObjectId) -> Result<UserResponse, ServiceError>;
    async fn update_profile(
        &self,
        user_id: &ObjectId,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, ServiceError>;
    async fn change_password(
        &self,
        user_id: &ObjectId,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError>;
    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError>;
    async fn activity_log(&self) -> Result<Vec<ActivityEntryResponse>, ServiceError>;
    async fn setup_admin(&self) -> Result<SetupAdminResponse, ServiceError>;
    /// Creates the account if the email is unknown; used by startup seeding
    async fn ensure_default_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub seed_config: SeedConfig,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        seed_config: SeedConfig,
    ) -> Self {
        Self {
            user_repo,
            activity_repo,
            jwt_utils,
            seed_config,
        }
    }

    fn check_strength(password: &str) -> Result<(), ServiceError> {
        PasswordUtilsImpl::validate_password_strength(password)
            .map_err(|errors| ServiceError::InvalidInput(errors.join("; ")))
    }

    fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let user_id = user.id.as_ref().map(|id| id.to_hex()).unwrap_or_default();
        self.jwt_utils
            .generate_token(&user_id)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }

    async fn record(&self, user: &User, action: &str, details: String) {
        let entry = ActivityEntry {
            id: None,
            user_id: user.id.as_ref().map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            action: action.to_string(),
            details,
            timestamp: bson::DateTime::now(),
        };
        if let Err(e) = self.activity_repo.insert(entry).await {
            warn!("Failed to record activity: {}", e);
        }
    }

    async fn find_user(&self, user_id: &ObjectId) -> Result<User, ServiceError> {
        let user = self.user_repo.find_by_id(user_id).await?;
        user.ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(username = %request.username, email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        info!("Registering new user");

        let role = match request.role.as_deref() {
            Some(role) => Role::from_str(role).map_err(ServiceError::InvalidInput)?,
            None => Role::Viewer,
        };
        Self::check_strength(&request.password)?;

        if self.user_repo.find_by_email(&request.email).await?.is_some()
            || self
                .user_repo
                .find_by_username(&request.username)
                .await?
                .is_some()
        {
            return Err(ServiceError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let password_hash = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let user = User {
            id: None,
            username: request.username,
            email: request.email,
            password_hash,
            role,
            created_at: None,
            updated_at: None,
        };

        let inserted = match self.user_repo.insert(user).await {
            Ok(u) => u,
            Err(e) => {
                error!("Failed to insert user: {e}");
                return Err(e.into());
            }
        };
        let token = self.issue_token(&inserted)?;
        self.record(&inserted, "Registered", "Account created".to_string())
            .await;

        Ok(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: inserted.into(),
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        info!("User login attempt");

        // One failure message for both unknown email and bad password, so the
        // response never reveals whether the account exists.
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());

        let user = self
            .user_repo
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;
        let valid = PasswordUtilsImpl::verify_password(&request.password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            info!("Invalid credentials for login attempt");
            return Err(invalid());
        }

        let token = self.issue_token(&user)?;
        self.record(&user, "Login", "User logged in successfully".to_string())
            .await;
        info!("User logged in successfully");

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            token,
            user: user.into(),
        })
    }

    async fn get_profile(&self, user_id: &ObjectId) -> Result<UserResponse, ServiceError> {
        Ok(self.find_user(user_id).await?.into())
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    async fn update_profile(
        &self,
        user_id: &ObjectId,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, ServiceError> {
        info!("Updating user profile");
        let mut user = self.find_user(user_id).await?;

        if let Some(email) = request.email {
            if let Some(existing) = self.user_repo.find_by_email(&email).await? {
                if existing.id != user.id {
                    return Err(ServiceError::Conflict("Email already taken".to_string()));
                }
            }
            user.email = email;
        }
        if let Some(username) = request.username {
            if let Some(existing) = self.user_repo.find_by_username(&username).await? {
                if existing.id != user.id {
                    return Err(ServiceError::Conflict("Username already taken".to_string()));
                }
            }
            user.username = username;
        }
        if let Some(role) = request.role {
            user.role = Role::from_str(&role).map_err(ServiceError::InvalidInput)?;
        }

        let updated = self.user_repo.update(*user_id, user).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self, request), fields(user_id = %user_id))]
    async fn change_password(
        &self,
        user_id: &ObjectId,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        info!("Changing user password");
        let mut user = self.find_user(user_id).await?;

        let valid =
            PasswordUtilsImpl::verify_password(&request.current_password, &user.password_hash)
                .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            return Err(ServiceError::InvalidInput(
                "Current password is incorrect".to_string(),
            ));
        }
        Self::check_strength(&request.new_password)?;

        user.password_hash = PasswordUtilsImpl::hash_password(&request.new_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        self.user_repo.update(*user_id, user.clone()).await?;
        self.record(&user, "Changed Password", "Password updated".to_string())
            .await;
        info!("Password changed successfully");
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users = self.user_repo.list_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn activity_log(&self) -> Result<Vec<ActivityEntryResponse>, ServiceError> {
        let entries = self.activity_repo.list_recent(ACTIVITY_LOG_LIMIT).await?;
        Ok(entries.into_iter().map(ActivityEntryResponse::from).collect())
    }

    #[instrument(skip(self))]
    async fn setup_admin(&self) -> Result<SetupAdminResponse, ServiceError> {
        if self.user_repo.find_by_role(Role::Admin).await?.is_some() {
            info!("Admin user already exists, setup is a no-op");
            return Ok(SetupAdminResponse {
                message: "Admin user already exists".to_string(),
                token: None,
                user: None,
            });
        }

        let password_hash = PasswordUtilsImpl::hash_password(&self.seed_config.admin_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let admin = User {
            id: None,
            username: "admin".to_string(),
            email: self.seed_config.admin_email.clone(),
            password_hash,
            role: Role::Admin,
            created_at: None,
            updated_at: None,
        };
        let inserted = self.user_repo.insert(admin).await?;
        let token = self.issue_token(&inserted)?;
        info!("Admin user created");

        Ok(SetupAdminResponse {
            message: "Admin user created successfully".to_string(),
            token: Some(token),
            user: Some(inserted.into()),
        })
    }

    async fn ensure_default_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ServiceError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }
        let password_hash = PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let user = User {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: None,
            updated_at: None,
        };
        self.user_repo.insert(user).await?;
        info!("Created default {} account: {}", role, email);
        Ok(())
    }
}
