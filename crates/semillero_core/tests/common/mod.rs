#![allow(dead_code)]

use rusqlite::Connection;
use semillero_core::auth::{Actor, Role};
use semillero_core::model::academic_offer::AcademicOffer;
use semillero_core::model::enrollment::Enrollment;
use semillero_core::model::module::Module;
use semillero_core::model::monitor::{AcademicMonitor, AdministrativeMonitor};
use semillero_core::model::student::Student;
use semillero_core::repo::auth_repo::{AuthRepository, SqliteAuthRepository};
use semillero_core::storage::{FileStore, StorageError, StorageResult};
use semillero_core::ResourceController;
use std::cell::RefCell;
use uuid::Uuid;

/// Registers a user with `role` and returns its actor.
pub fn actor(conn: &Connection, role: Role) -> Actor {
    let repo = SqliteAuthRepository::try_new(conn).unwrap();
    let username = format!("{}_{}", role.as_str(), &Uuid::new_v4().simple().to_string()[..8]);
    let account = repo.create_user(&username, role).unwrap();
    Actor::new(account.id, role)
}

pub fn student(document_number: &str) -> Student {
    let mut student = Student::new("Ana", "Pérez", document_number);
    student.birth_date = "2011-04-09".to_string();
    student.email = "ana.perez@example.org".to_string();
    student.phone = "3001234567".to_string();
    student.school = "IE San José".to_string();
    student.grade = 8;
    student
}

pub fn module(name: &str) -> Module {
    let mut module = Module::new(name, "matemáticas");
    module.description = "Pensamiento lógico".to_string();
    module
}

pub fn offer() -> AcademicOffer {
    let mut offer = AcademicOffer::new("Semillero 2024-1", 2024, 1);
    offer.start_date = "2024-02-01".to_string();
    offer.end_date = "2024-06-15".to_string();
    offer
}

pub fn academic_monitor(document_number: &str) -> AcademicMonitor {
    let mut monitor = AcademicMonitor::new("Luis", "Gómez", document_number);
    monitor.email = "luis.gomez@example.org".to_string();
    monitor.phone = "3109876543".to_string();
    monitor
}

pub fn administrative_monitor(document_number: &str) -> AdministrativeMonitor {
    let mut monitor = AdministrativeMonitor::new("Marta", "Ríos", document_number);
    monitor.email = "marta.rios@example.org".to_string();
    monitor.phone = "3201112233".to_string();
    monitor
}

/// Student, module and offer created by `admin`, plus a fresh enrollment.
pub fn enrollment_fixture<F: FileStore + ?Sized>(
    conn: &Connection,
    files: &F,
    admin: &Actor,
) -> Enrollment {
    let student = ResourceController::<Student, F>::new(conn, files)
        .unwrap()
        .create(admin, student("1002003004"))
        .unwrap();
    let module = ResourceController::<Module, F>::new(conn, files)
        .unwrap()
        .create(admin, module("Álgebra"))
        .unwrap();
    let offer = ResourceController::<AcademicOffer, F>::new(conn, files)
        .unwrap()
        .create(admin, offer())
        .unwrap();

    ResourceController::<Enrollment, F>::new(conn, files)
        .unwrap()
        .create(
            admin,
            Enrollment::new(student.id, module.id, offer.id, 1_706_745_600_000),
        )
        .unwrap()
}

/// File store that records calls and can be told to fail deletions.
#[derive(Default)]
pub struct MemoryFileStore {
    pub saved: RefCell<Vec<String>>,
    pub deleted: RefCell<Vec<String>>,
    pub fail_deletes: bool,
}

impl MemoryFileStore {
    pub fn failing() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }
}

impl FileStore for MemoryFileStore {
    fn save(&self, relative_path: &str, _bytes: &[u8]) -> StorageResult<()> {
        self.saved.borrow_mut().push(relative_path.to_string());
        Ok(())
    }

    fn delete(&self, relative_path: &str) -> StorageResult<()> {
        if self.fail_deletes {
            return Err(StorageError::Io {
                path: relative_path.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.deleted.borrow_mut().push(relative_path.to_string());
        Ok(())
    }
}
