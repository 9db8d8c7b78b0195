use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeePatch, NewEmployee};
use crate::utils::forms::{none_if_empty, read_employee_form};
use crate::utils::uploads::UploadStore;
use crate::utils::validation::validate_payload;

const EMPLOYEE_COLUMNS: &str =
    "id, name, department, designation, project, type, status, image_path, created_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}

pub async fn list_employees(pool: web::Data<PgPool>) -> Result<HttpResponse, actix_web::Error> {
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {} FROM employees ORDER BY created_at DESC",
        EMPLOYEE_COLUMNS
    ))
    .fetch_all(&**pool)
    .await
    .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    pool: web::Data<PgPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let employee = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {} FROM employees WHERE id = $1",
        EMPLOYEE_COLUMNS
    ))
    .bind(id.into_inner())
    .fetch_optional(&**pool)
    .await
    .map_err(AppError::from)?
    .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(employee))
}

pub async fn create_employee(
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<PgPool>,
    uploads: web::Data<UploadStore>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = read_employee_form(&req, payload, &uploads).await?;

    let new_employee = NewEmployee {
        id: form.id.unwrap_or_default(),
        name: form.name.unwrap_or_default(),
        department: form.department.and_then(none_if_empty),
        designation: form.designation.and_then(none_if_empty),
        project: form.project.and_then(none_if_empty),
        kind: form.kind.and_then(none_if_empty),
        status: form.status.and_then(none_if_empty),
        image_path: form.image_path,
    };

    if let Err(err) = validate_payload(&new_employee) {
        // the image was already written to disk; don't strand it
        if let Some(path) = &new_employee.image_path {
            uploads.remove(path);
        }
        return Err(err.into());
    }

    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(&new_employee.id)
            .fetch_one(&**pool)
            .await
            .map_err(AppError::from)?;
    if exists {
        if let Some(path) = &new_employee.image_path {
            uploads.remove(path);
        }
        return Err(AppError::Conflict("Employee with this id already exists".to_string()).into());
    }

    let created_at = Utc::now();
    let inserted = sqlx::query(
        "INSERT INTO employees (id, name, department, designation, project, type, status, image_path, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&new_employee.id)
    .bind(&new_employee.name)
    .bind(&new_employee.department)
    .bind(&new_employee.designation)
    .bind(&new_employee.project)
    .bind(&new_employee.kind)
    .bind(&new_employee.status)
    .bind(&new_employee.image_path)
    .bind(created_at)
    .execute(&**pool)
    .await;

    if let Err(err) = inserted {
        if let Some(path) = &new_employee.image_path {
            uploads.remove(path);
        }
        // two concurrent creates can both pass the exists check
        if is_unique_violation(&err) {
            return Err(
                AppError::Conflict("Employee with this id already exists".to_string()).into(),
            );
        }
        return Err(AppError::from(err).into());
    }

    let employee = Employee {
        id: new_employee.id,
        name: new_employee.name,
        department: new_employee.department,
        designation: new_employee.designation,
        project: new_employee.project,
        kind: new_employee.kind,
        status: new_employee.status,
        image_path: new_employee.image_path,
        created_at,
    };
    Ok(HttpResponse::Created().json(employee))
}

pub async fn update_employee(
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<PgPool>,
    uploads: web::Data<UploadStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let id = id.into_inner();
    let form = read_employee_form(&req, payload, &uploads).await?;

    let old_image =
        sqlx::query_scalar::<_, Option<String>>("SELECT image_path FROM employees WHERE id = $1")
            .bind(&id)
            .fetch_optional(&**pool)
            .await
            .map_err(AppError::from)?;
    let old_image = match old_image {
        Some(image) => image,
        None => {
            if let Some(path) = &form.image_path {
                uploads.remove(path);
            }
            return Err(AppError::NotFound("Employee not found".to_string()).into());
        }
    };

    let remove_image = form.remove_image_requested() && form.image_path.is_none();
    let patch = EmployeePatch {
        name: form.name,
        department: form.department.map(none_if_empty),
        designation: form.designation.map(none_if_empty),
        project: form.project.map(none_if_empty),
        kind: form.kind.map(none_if_empty),
        status: form.status.map(none_if_empty),
        image_path: match (form.image_path, remove_image) {
            (Some(path), _) => Some(Some(path)),
            (None, true) => Some(None),
            (None, false) => None,
        },
    };

    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()).into());
    }
    let image_changed = patch.image_path.is_some();

    let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE employees SET ");
    {
        let mut sep = qb.separated(", ");
        if let Some(name) = &patch.name {
            sep.push("name = ").push_bind_unseparated(name);
        }
        if let Some(department) = &patch.department {
            sep.push("department = ")
                .push_bind_unseparated(department.as_deref());
        }
        if let Some(designation) = &patch.designation {
            sep.push("designation = ")
                .push_bind_unseparated(designation.as_deref());
        }
        if let Some(project) = &patch.project {
            sep.push("project = ")
                .push_bind_unseparated(project.as_deref());
        }
        if let Some(kind) = &patch.kind {
            sep.push("type = ").push_bind_unseparated(kind.as_deref());
        }
        if let Some(status) = &patch.status {
            sep.push("status = ")
                .push_bind_unseparated(status.as_deref());
        }
        if let Some(image_path) = &patch.image_path {
            sep.push("image_path = ")
                .push_bind_unseparated(image_path.as_deref());
        }
    }
    qb.push(" WHERE id = ").push_bind(&id);

    let result = qb.build().execute(&**pool).await.map_err(AppError::from)?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".to_string()).into());
    }

    // row committed first; a crash here orphans a file, never a reference
    if image_changed {
        if let Some(old) = old_image {
            uploads.remove(&old);
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "updated": true })))
}

pub async fn delete_employee(
    pool: web::Data<PgPool>,
    uploads: web::Data<UploadStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let id = id.into_inner();

    let image_path =
        sqlx::query_scalar::<_, Option<String>>("SELECT image_path FROM employees WHERE id = $1")
            .bind(&id)
            .fetch_optional(&**pool)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(&id)
        .execute(&**pool)
        .await
        .map_err(AppError::from)?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Not found".to_string()).into());
    }

    if let Some(image) = image_path {
        uploads.remove(&image);
    }

    Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
}
