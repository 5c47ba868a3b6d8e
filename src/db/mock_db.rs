use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    appointment_repository::AppointmentRepository, category_repository::CategoryRepository,
    user_repository::UserRepository,
};
use crate::{
    models::{
        appointment::{Appointment, AppointmentPayload},
        category::{Category, CategoryPayload},
        user::{NewUser, User, UserRole, UserStatus, UserUpdate},
    },
    utils::password::hash_password,
};

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("Mock DB failure".into())
}

/// In-memory stand-in for every document collection except sessions.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<Vec<User>>,
    pub categories: Mutex<Vec<Category>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub should_fail: bool,
}

impl MockDb {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            Err(mock_failure())
        } else {
            Ok(())
        }
    }
}

pub fn test_user(email: &str, password: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.into(),
        password_hash: hash_password(password).expect("test password should hash"),
        first_name: "Test".into(),
        last_name: "User".into(),
        profile_image: None,
        role,
        status: UserStatus::Active,
        password_changed_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn create_user(
        &self,
        payload: &NewUser,
        password_hash: &str,
    ) -> Result<Uuid, sqlx::Error> {
        self.check()?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: payload.email.trim().to_string(),
            password_hash: password_hash.to_string(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            profile_image: payload.profile_image.clone(),
            role: payload.role,
            status: payload.status,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        self.users.lock().unwrap().push(user);
        Ok(id)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|user| user.id == user_id).map(|user| {
            user.email = update.email.trim().to_string();
            user.first_name = update.first_name.clone();
            user.last_name = update.last_name.clone();
            user.profile_image = update.profile_image.clone();
            user.role = update.role;
            user.status = update.status;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|user| user.id != user_id);
        Ok(users.len() != before)
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.password_changed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_user_role(&self, user_id: Uuid, role: UserRole) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|user| user.id == user_id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CategoryRepository for MockDb {
    async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        self.check()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        self.check()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, sqlx::Error> {
        self.check()?;
        let category = Category {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            description: payload.description.clone(),
        };
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Option<Category>, sqlx::Error> {
        self.check()?;
        let mut categories = self.categories.lock().unwrap();
        Ok(categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = payload.name.trim().to_string();
            c.description = payload.description.clone();
            c.clone()
        }))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() != before)
    }
}

#[async_trait]
impl AppointmentRepository for MockDb {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error> {
        self.check()?;
        Ok(self.appointments.lock().unwrap().clone())
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, sqlx::Error> {
        self.check()?;
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<Appointment, sqlx::Error> {
        self.check()?;
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            date: payload.date,
            duration: payload.duration,
            address: payload.address.clone(),
            status: payload.status.clone(),
            created_by: payload.created_by,
            helper: payload.helper,
            created_at: now,
            updated_at: now,
        };
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        payload: &AppointmentPayload,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        self.check()?;
        let mut appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter_mut().find(|a| a.id == id).map(|a| {
            a.date = payload.date;
            a.duration = payload.duration;
            a.address = payload.address.clone();
            a.status = payload.status.clone();
            a.created_by = payload.created_by;
            a.helper = payload.helper;
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        self.check()?;
        let mut appointments = self.appointments.lock().unwrap();
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        Ok(appointments.len() != before)
    }
}
