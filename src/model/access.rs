use crate::{
    model::{
        ModelManager,
        entity::{Course, Enrollment},
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

#[async_trait::async_trait]
pub trait HasOwner {
    type OwnerId: PartialEq + Send + Sync;
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        ctx: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId>;
}

pub async fn check_access<T: HasOwner<OwnerId = O>, O: PartialEq + Send + Sync>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
    expected: O,
) -> DatabaseResult<()> {
    let actual_owner = resource.get_owner_id(mm, ctx).await?;

    // admin can get all resources
    if ctx.user_role() == UserRole::Admin {
        return Ok(());
    }

    if actual_owner == expected {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}

/// Enrollment gate for course content. The course's instructor and admins always
/// pass, everybody else needs an enrollment row for the course.
pub async fn can_access_course(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    course: &Course,
) -> DatabaseResult<bool> {
    match check_access(mm, ctx, course, ctx.user_id()).await {
        Ok(()) => return Ok(true),
        Err(DatabaseError::Forbidden) => {}
        Err(e) => return Err(e),
    }

    Enrollment::exists(mm, ctx, ctx.user_id(), course.id()).await
}
