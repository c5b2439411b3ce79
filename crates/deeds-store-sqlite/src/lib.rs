use chrono::{DateTime, Utc};
use deeds_storage::{
    AdvanceOutcome, AdvanceRoundParams, Assignment, AssignmentEvent, AssignmentEventId,
    AssignmentEventKind, AssignmentId, AssignmentState, CreateGroupParams, CreateRoundParams,
    DeedTemplate, DescribeAssignmentParams, Group, GroupId, Member, MemberId, NewAssignment,
    Round, RoundId, RoundStatus, Store, StoreError, TemplateId, UpdateAssignmentParams,
};
use sqlx::{sqlite::SqlitePoolOptions, SqliteConnection, SqlitePool};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const MEMBER_COLS: &str = "id, name, created_at";
const GROUP_COLS: &str = "id, name, owner_id, created_at";
const ROUND_COLS: &str =
    "id, group_id, name, status, access_code, successor_id, created_at, started_at, closed_at";
const ASSIGNMENT_COLS: &str = "id, round_id, giver_id, recipient_id, description, state, proof, \
     submitted_at, completed_at, verified_by, rejection_count, created_at";
const TEMPLATE_COLS: &str = "id, description, active, created_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    /// Open (or create, with `?mode=rwc`) a database and run pending migrations.
    ///
    /// The pool holds a single connection, so every transaction below is
    /// serialized and an in-memory database lives as long as the store.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await
            .map_err(backend)?;

        MIGRATOR.run(&pool).await.map_err(backend)?;

        Ok(Self { pool })
    }

    /// Cheap liveness probe used by the readiness check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

// ───────────────────────────────────── Row mapping ────────────────────────────────────

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map constraint violations on writes to their storage-level meaning.
fn write_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else if s.contains("FOREIGN KEY") {
        StoreError::NotFound
    } else {
        StoreError::Backend(s)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn parse_id(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(backend)
}

fn to_ts(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {ms}")))
}

fn opt_ts(ms: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    ms.map(to_ts).transpose()
}

fn ts_ms(ts: Option<DateTime<Utc>>) -> Option<i64> {
    ts.map(|t| t.timestamp_millis())
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: String,
    name: String,
    created_at: i64,
}

impl TryFrom<MemberRow> for Member {
    type Error = StoreError;

    fn try_from(r: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            id: MemberId(parse_id(&r.id)?),
            name: r.name,
            created_at: to_ts(r.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: String,
    name: String,
    owner_id: String,
    created_at: i64,
}

impl TryFrom<GroupRow> for Group {
    type Error = StoreError;

    fn try_from(r: GroupRow) -> Result<Self, Self::Error> {
        Ok(Group {
            id: GroupId(parse_id(&r.id)?),
            name: r.name,
            owner_id: MemberId(parse_id(&r.owner_id)?),
            created_at: to_ts(r.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoundRow {
    id: String,
    group_id: String,
    name: String,
    status: String,
    access_code: Option<String>,
    successor_id: Option<String>,
    created_at: i64,
    started_at: Option<i64>,
    closed_at: Option<i64>,
}

impl TryFrom<RoundRow> for Round {
    type Error = StoreError;

    fn try_from(r: RoundRow) -> Result<Self, Self::Error> {
        Ok(Round {
            id: RoundId(parse_id(&r.id)?),
            group_id: GroupId(parse_id(&r.group_id)?),
            name: r.name,
            status: r.status.parse::<RoundStatus>().map_err(backend)?,
            access_code: r.access_code,
            successor_id: r
                .successor_id
                .as_deref()
                .map(parse_id)
                .transpose()?
                .map(RoundId),
            created_at: to_ts(r.created_at)?,
            started_at: opt_ts(r.started_at)?,
            closed_at: opt_ts(r.closed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: String,
    round_id: String,
    giver_id: String,
    recipient_id: String,
    description: String,
    state: String,
    proof: Option<String>,
    submitted_at: Option<i64>,
    completed_at: Option<i64>,
    verified_by: Option<String>,
    rejection_count: i64,
    created_at: i64,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = StoreError;

    fn try_from(r: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Assignment {
            id: AssignmentId(parse_id(&r.id)?),
            round_id: RoundId(parse_id(&r.round_id)?),
            giver_id: MemberId(parse_id(&r.giver_id)?),
            recipient_id: MemberId(parse_id(&r.recipient_id)?),
            description: r.description,
            state: r.state.parse::<AssignmentState>().map_err(backend)?,
            proof: r.proof,
            submitted_at: opt_ts(r.submitted_at)?,
            completed_at: opt_ts(r.completed_at)?,
            verified_by: r
                .verified_by
                .as_deref()
                .map(parse_id)
                .transpose()?
                .map(MemberId),
            rejection_count: u32::try_from(r.rejection_count).map_err(backend)?,
            created_at: to_ts(r.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    assignment_id: String,
    kind: String,
    actor_id: String,
    note: Option<String>,
    created_at: i64,
}

impl TryFrom<EventRow> for AssignmentEvent {
    type Error = StoreError;

    fn try_from(r: EventRow) -> Result<Self, Self::Error> {
        Ok(AssignmentEvent {
            id: AssignmentEventId(parse_id(&r.id)?),
            assignment_id: AssignmentId(parse_id(&r.assignment_id)?),
            kind: r.kind.parse::<AssignmentEventKind>().map_err(backend)?,
            actor_id: MemberId(parse_id(&r.actor_id)?),
            note: r.note,
            created_at: to_ts(r.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    description: String,
    active: bool,
    created_at: i64,
}

impl TryFrom<TemplateRow> for DeedTemplate {
    type Error = StoreError;

    fn try_from(r: TemplateRow) -> Result<Self, Self::Error> {
        Ok(DeedTemplate {
            id: TemplateId(parse_id(&r.id)?),
            description: r.description,
            active: r.active,
            created_at: to_ts(r.created_at)?,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ───────────────────────────────────── In-transaction helpers ─────────────────────────
//
// The pool has one connection: while a transaction is open every statement
// must run on it, never on `self.pool`.

async fn round_status(
    conn: &mut SqliteConnection,
    round_id: &RoundId,
) -> Result<Option<(RoundStatus, Option<RoundId>)>, StoreError> {
    let row = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT status, successor_id FROM rounds WHERE id=?",
    )
    .bind(round_id.0.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(backend)?;

    match row {
        None => Ok(None),
        Some((status, successor)) => {
            let status = status.parse::<RoundStatus>().map_err(backend)?;
            let successor = successor
                .as_deref()
                .map(parse_id)
                .transpose()?
                .map(RoundId);
            Ok(Some((status, successor)))
        }
    }
}

async fn insert_assignments(
    conn: &mut SqliteConnection,
    round_id: &RoundId,
    assignments: &[NewAssignment],
    now: i64,
) -> Result<(), StoreError> {
    for a in assignments {
        sqlx::query(
            "INSERT INTO assignments(id,round_id,giver_id,recipient_id,description,state,created_at)
             VALUES(?,?,?,?,?,'pending',?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(round_id.0.to_string())
        .bind(a.giver_id.0.to_string())
        .bind(a.recipient_id.0.to_string())
        .bind(&a.description)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(write_err)?;
    }
    Ok(())
}

async fn insert_event(
    conn: &mut SqliteConnection,
    assignment_id: &AssignmentId,
    kind: AssignmentEventKind,
    actor_id: &MemberId,
    note: Option<&str>,
    now: i64,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO assignment_events(id,assignment_id,kind,actor_id,note,created_at)
         VALUES(?,?,?,?,?,?)",
    )
    .bind(Uuid::now_v7().to_string())
    .bind(assignment_id.0.to_string())
    .bind(kind.as_str())
    .bind(actor_id.0.to_string())
    .bind(note)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(write_err)?;
    Ok(())
}

async fn assignment_exists(
    conn: &mut SqliteConnection,
    assignment_id: &AssignmentId,
) -> Result<bool, StoreError> {
    let row = sqlx::query_as::<_, (i64,)>("SELECT 1 FROM assignments WHERE id=?")
        .bind(assignment_id.0.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(backend)?;
    Ok(row.is_some())
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────────────── Members ────────────────────────────────────────

    async fn create_member(&self, name: &str) -> Result<Member, StoreError> {
        sqlx::query(
            "INSERT INTO members(id,name,created_at) VALUES(?,?,?)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(name)
        .bind(now_ms())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.get_member_by_name(name).await
    }

    async fn get_member(&self, member_id: &MemberId) -> Result<Member, StoreError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLS} FROM members WHERE id=?"
        ))
        .bind(member_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_member_by_name(&self, name: &str) -> Result<Member, StoreError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLS} FROM members WHERE name=?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLS} FROM members ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    async fn rename_member(&self, member_id: &MemberId, name: &str) -> Result<Member, StoreError> {
        let res = sqlx::query("UPDATE members SET name=? WHERE id=?")
            .bind(name)
            .bind(member_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_member(member_id).await
    }

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError> {
        let group_id = GroupId(Uuid::now_v7());
        let now = now_ms();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query("INSERT INTO groups(id,name,owner_id,created_at) VALUES(?,?,?,?)")
            .bind(group_id.0.to_string())
            .bind(&params.name)
            .bind(params.owner_id.0.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        sqlx::query("INSERT INTO group_members(group_id,member_id,joined_at) VALUES(?,?,?)")
            .bind(group_id.0.to_string())
            .bind(params.owner_id.0.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        tx.commit().await.map_err(backend)?;
        self.get_group(&group_id).await
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLS} FROM groups WHERE id=?"
        ))
        .bind(group_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn add_group_member(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO group_members(group_id,member_id,joined_at) VALUES(?,?,?)
             ON CONFLICT(group_id,member_id) DO NOTHING",
        )
        .bind(group_id.0.to_string())
        .bind(member_id.0.to_string())
        .bind(now_ms())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn list_group_members(&self, group_id: &GroupId) -> Result<Vec<Member>, StoreError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT m.id, m.name, m.created_at
             FROM group_members gm
             JOIN members m ON m.id = gm.member_id
             WHERE gm.group_id=?
             ORDER BY gm.joined_at, gm.rowid",
        )
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    async fn list_member_groups(&self, member_id: &MemberId) -> Result<Vec<Group>, StoreError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT g.id, g.name, g.owner_id, g.created_at
             FROM group_members gm
             JOIN groups g ON g.id = gm.group_id
             WHERE gm.member_id=?
             ORDER BY gm.joined_at, gm.rowid",
        )
        .bind(member_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    // ───────────────────────────────────── Rounds ─────────────────────────────────────────

    async fn create_round(&self, params: &CreateRoundParams) -> Result<Round, StoreError> {
        let round_id = RoundId(Uuid::now_v7());
        sqlx::query(
            "INSERT INTO rounds(id,group_id,name,status,access_code,created_at)
             VALUES(?,?,?,'pending',?,?)",
        )
        .bind(round_id.0.to_string())
        .bind(params.group_id.0.to_string())
        .bind(&params.name)
        .bind(params.access_code.as_deref())
        .bind(now_ms())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.get_round(&round_id).await
    }

    async fn get_round(&self, round_id: &RoundId) -> Result<Round, StoreError> {
        let row = sqlx::query_as::<_, RoundRow>(&format!(
            "SELECT {ROUND_COLS} FROM rounds WHERE id=?"
        ))
        .bind(round_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn list_rounds(&self, group_id: &GroupId) -> Result<Vec<Round>, StoreError> {
        let rows = sqlx::query_as::<_, RoundRow>(&format!(
            "SELECT {ROUND_COLS} FROM rounds WHERE group_id=?
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    async fn get_active_round(&self, group_id: &GroupId) -> Result<Round, StoreError> {
        let row = sqlx::query_as::<_, RoundRow>(&format!(
            "SELECT {ROUND_COLS} FROM rounds WHERE group_id=? AND status='started'"
        ))
        .bind(group_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn start_round(
        &self,
        round_id: &RoundId,
        assignments: &[NewAssignment],
    ) -> Result<Round, StoreError> {
        let now = now_ms();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // CAS pending → started; the partial unique index rejects a second
        // started round in the same group.
        let res = sqlx::query(
            "UPDATE rounds SET status='started', started_at=? WHERE id=? AND status='pending'",
        )
        .bind(now)
        .bind(round_id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return match round_status(&mut tx, round_id).await? {
                None => Err(StoreError::NotFound),
                Some(_) => Err(StoreError::Conflict),
            };
        }

        insert_assignments(&mut tx, round_id, assignments, now).await?;
        tx.commit().await.map_err(backend)?;

        self.get_round(round_id).await
    }

    async fn close_round(&self, round_id: &RoundId) -> Result<Round, StoreError> {
        let res = sqlx::query(
            "UPDATE rounds SET status='closed', closed_at=? WHERE id=? AND status='started'",
        )
        .bind(now_ms())
        .bind(round_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if res.rows_affected() == 0 {
            // Distinguish a missing round from one in the wrong state.
            self.get_round(round_id).await?;
            return Err(StoreError::Conflict);
        }
        self.get_round(round_id).await
    }

    async fn set_access_code(&self, round_id: &RoundId, code: &str) -> Result<Round, StoreError> {
        let res = sqlx::query("UPDATE rounds SET access_code=? WHERE id=? AND status='pending'")
            .bind(code)
            .bind(round_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if res.rows_affected() == 0 {
            self.get_round(round_id).await?;
            return Err(StoreError::Conflict);
        }
        self.get_round(round_id).await
    }

    async fn advance_round(
        &self,
        params: &AdvanceRoundParams,
    ) -> Result<AdvanceOutcome, StoreError> {
        let next_id = RoundId(Uuid::now_v7());
        let now = now_ms();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // The successor must exist before the old round can point at it.
        sqlx::query(
            "INSERT INTO rounds(id,group_id,name,status,access_code,created_at)
             VALUES(?,?,?,'pending',?,?)",
        )
        .bind(next_id.0.to_string())
        .bind(params.next.group_id.0.to_string())
        .bind(&params.next.name)
        .bind(params.next.access_code.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        let res = sqlx::query(
            "UPDATE rounds SET status='closed', closed_at=?, successor_id=?
             WHERE id=? AND status='started'",
        )
        .bind(now)
        .bind(next_id.0.to_string())
        .bind(params.round_id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if res.rows_affected() == 0 {
            // Lost the race (or the round was never started). Dropping `tx`
            // rolls back the successor insert.
            return match round_status(&mut tx, &params.round_id).await? {
                None => Err(StoreError::NotFound),
                Some((RoundStatus::Closed, Some(successor))) => {
                    Ok(AdvanceOutcome::AlreadyAdvanced(successor))
                }
                Some(_) => Err(StoreError::Conflict),
            };
        }

        sqlx::query("UPDATE rounds SET status='started', started_at=? WHERE id=?")
            .bind(now)
            .bind(next_id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        insert_assignments(&mut tx, &next_id, &params.assignments, now).await?;
        tx.commit().await.map_err(backend)?;

        Ok(AdvanceOutcome::Advanced(self.get_round(&next_id).await?))
    }

    // ───────────────────────────────────── Assignments ────────────────────────────────────

    async fn list_assignments(&self, round_id: &RoundId) -> Result<Vec<Assignment>, StoreError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLS} FROM assignments WHERE round_id=? ORDER BY rowid"
        ))
        .bind(round_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    async fn get_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Assignment, StoreError> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLS} FROM assignments WHERE id=?"
        ))
        .bind(assignment_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_assignment_for_giver(
        &self,
        round_id: &RoundId,
        giver_id: &MemberId,
    ) -> Result<Assignment, StoreError> {
        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLS} FROM assignments WHERE round_id=? AND giver_id=?"
        ))
        .bind(round_id.0.to_string())
        .bind(giver_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn update_assignment(
        &self,
        params: &UpdateAssignmentParams,
    ) -> Result<Assignment, StoreError> {
        if params.expected.is_empty() {
            return Err(StoreError::Conflict);
        }
        let now = now_ms();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let sql = format!(
            "UPDATE assignments
             SET state=?, proof=?, submitted_at=?, completed_at=COALESCE(completed_at, ?),
                 verified_by=?, rejection_count=rejection_count + ?
             WHERE id=? AND state IN ({})",
            placeholders(params.expected.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(params.state.as_str())
            .bind(params.proof.as_deref())
            .bind(ts_ms(params.submitted_at))
            .bind(ts_ms(params.completed_at))
            .bind(params.verified_by.map(|m| m.0.to_string()))
            .bind(i64::from(params.increment_rejections))
            .bind(params.id.0.to_string());
        for state in &params.expected {
            query = query.bind(state.as_str());
        }
        let res = query.execute(&mut *tx).await.map_err(write_err)?;

        if res.rows_affected() == 0 {
            return if assignment_exists(&mut tx, &params.id).await? {
                Err(StoreError::Conflict)
            } else {
                Err(StoreError::NotFound)
            };
        }

        insert_event(
            &mut tx,
            &params.id,
            params.event,
            &params.actor_id,
            params.note.as_deref(),
            now,
        )
        .await?;
        tx.commit().await.map_err(backend)?;

        self.get_assignment(&params.id).await
    }

    async fn describe_assignment(
        &self,
        params: &DescribeAssignmentParams,
    ) -> Result<Assignment, StoreError> {
        if params.expected.is_empty() {
            return Err(StoreError::Conflict);
        }
        let now = now_ms();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let sql = format!(
            "UPDATE assignments SET description=? WHERE id=? AND state IN ({})",
            placeholders(params.expected.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(&params.description)
            .bind(params.id.0.to_string());
        for state in &params.expected {
            query = query.bind(state.as_str());
        }
        let res = query.execute(&mut *tx).await.map_err(backend)?;

        if res.rows_affected() == 0 {
            return if assignment_exists(&mut tx, &params.id).await? {
                Err(StoreError::Conflict)
            } else {
                Err(StoreError::NotFound)
            };
        }

        insert_event(
            &mut tx,
            &params.id,
            AssignmentEventKind::Described,
            &params.actor_id,
            Some(&params.description),
            now,
        )
        .await?;
        tx.commit().await.map_err(backend)?;

        self.get_assignment(&params.id).await
    }

    async fn list_assignment_events(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<AssignmentEvent>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, assignment_id, kind, actor_id, note, created_at
             FROM assignment_events WHERE assignment_id=?
             ORDER BY created_at, rowid",
        )
        .bind(assignment_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    // ───────────────────────────────────── Templates ──────────────────────────────────────

    async fn create_template(&self, description: &str) -> Result<DeedTemplate, StoreError> {
        let template_id = TemplateId(Uuid::now_v7());
        sqlx::query("INSERT INTO deed_templates(id,description,active,created_at) VALUES(?,?,1,?)")
            .bind(template_id.0.to_string())
            .bind(description)
            .bind(now_ms())
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {TEMPLATE_COLS} FROM deed_templates WHERE id=?"
        ))
        .bind(template_id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        row.try_into()
    }

    async fn list_templates(&self, active_only: bool) -> Result<Vec<DeedTemplate>, StoreError> {
        let rows = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {TEMPLATE_COLS} FROM deed_templates
             WHERE (? = 0 OR active = 1)
             ORDER BY created_at, rowid"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        collect(rows)
    }

    async fn set_template_active(
        &self,
        template_id: &TemplateId,
        active: bool,
    ) -> Result<DeedTemplate, StoreError> {
        let res = sqlx::query("UPDATE deed_templates SET active=? WHERE id=?")
            .bind(active)
            .bind(template_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {TEMPLATE_COLS} FROM deed_templates WHERE id=?"
        ))
        .bind(template_id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        row.try_into()
    }

    // ───────────────────────────────────── Celebrations ───────────────────────────────────

    async fn mark_celebration_seen(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO celebrations(round_id,member_id,seen_at) VALUES(?,?,?)
             ON CONFLICT(round_id,member_id) DO NOTHING",
        )
        .bind(round_id.0.to_string())
        .bind(member_id.0.to_string())
        .bind(now_ms())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn has_seen_celebration(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT 1 FROM celebrations WHERE round_id=? AND member_id=?",
        )
        .bind(round_id.0.to_string())
        .bind(member_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.is_some())
    }
}
