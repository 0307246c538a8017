/*!
Sequential smoketest runner.

Each step sends one request, checks the response for the success marker and prints a
line. The first failing step returns a Check error; callers exit with status 1 and no
further requests are sent. With `echo_json`, read-style steps print the pretty JSON
body after their success line.
*/

use std::io::Write;

use tracing::{info, warn};

use crate::api::{summarize_body, ApiClient, ApiResponse, NewBoxer, SortBy};
use crate::color::paint;
use crate::errors::SmokeError;

/// Boxer created by the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixture {
    pub name: &'static str,
    pub weight: u32,
    pub height: u32,
    pub reach: f64,
    pub age: u32,
}

impl Fixture {
    pub fn to_new_boxer(&self) -> NewBoxer {
        NewBoxer {
            name: self.name.to_string(),
            weight: self.weight,
            height: self.height,
            reach: self.reach,
            age: self.age,
        }
    }
}

pub const FIXTURES: [Fixture; 5] = [
    Fixture { name: "Ali", weight: 210, height: 75, reach: 80.0, age: 32 },
    Fixture { name: "Tyson", weight: 220, height: 72, reach: 78.0, age: 28 },
    Fixture { name: "Frazier", weight: 215, height: 71, reach: 76.0, age: 30 },
    Fixture { name: "Foreman", weight: 230, height: 76, reach: 82.0, age: 35 },
    Fixture { name: "Holyfield", weight: 200, height: 74, reach: 79.5, age: 31 },
];

/// Write and flush one line of run output.
pub(crate) fn write_line<W: Write>(out: &mut W, line: &str) -> Result<(), SmokeError> {
    writeln!(out, "{line}")
        .and_then(|_| out.flush())
        .map_err(|e| SmokeError::Setup(anyhow::Error::new(e).context("failed to write output")))
}

/// What a completed run observed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub steps_passed: usize,
    /// Boxer ids in FIXTURES order.
    pub boxer_ids: Vec<i64>,
    /// Winner of each fight, when the server reported one.
    pub winners: Vec<Option<String>>,
}

pub struct SmokeRunner<'a, W: Write> {
    client: &'a ApiClient,
    out: W,
    echo_json: bool,
    use_color: bool,
    steps_passed: usize,
}

impl<'a, W: Write> SmokeRunner<'a, W> {
    pub fn new(client: &'a ApiClient, out: W, echo_json: bool, use_color: bool) -> Self {
        Self {
            client,
            out,
            echo_json,
            use_color,
            steps_passed: 0,
        }
    }

    fn say(&mut self, msg: &str) -> Result<(), SmokeError> {
        write_line(&mut self.out, msg)
    }

    fn passed(&mut self, msg: &str) -> Result<(), SmokeError> {
        self.steps_passed += 1;
        let line = paint(self.use_color, "\x1b[32m", msg);
        write_line(&mut self.out, &line)
    }

    fn echo(&mut self, label: &str, resp: &ApiResponse) -> Result<(), SmokeError> {
        if self.echo_json {
            write_line(&mut self.out, &format!("{label}:"))?;
            write_line(&mut self.out, &resp.pretty())?;
        }
        Ok(())
    }

    fn expect_success(
        &self,
        step: &str,
        result: anyhow::Result<ApiResponse>,
    ) -> Result<ApiResponse, SmokeError> {
        match result {
            Ok(resp) if resp.is_success() => Ok(resp),
            Ok(resp) => {
                warn!(step, status = resp.status, "response missing success marker");
                Err(SmokeError::check(
                    step,
                    format!("HTTP {}: {}", resp.status, summarize_body(&resp.body)),
                ))
            }
            Err(e) => {
                warn!(step, error = %format!("{e:#}"), "request failed");
                Err(SmokeError::check(step, format!("{e:#}")))
            }
        }
    }

    pub fn check_health(&mut self) -> Result<(), SmokeError> {
        self.say("Checking health status...")?;
        let result = self.client.health();
        self.expect_success("check health", result)?;
        self.passed("Service is healthy.")?;
        Ok(())
    }

    pub fn check_db(&mut self) -> Result<(), SmokeError> {
        self.say("Checking database connection...")?;
        let result = self.client.db_check();
        self.expect_success("check database connection", result)?;
        self.passed("Database connection is healthy.")?;
        Ok(())
    }

    /// Create a boxer and return the id reported by the server, if any.
    pub fn create_boxer(&mut self, boxer: &NewBoxer) -> Result<Option<i64>, SmokeError> {
        self.say(&format!("Creating boxer ({})...", boxer.name))?;
        let result = self.client.create_boxer(boxer);
        let resp = self.expect_success(&format!("create boxer ({})", boxer.name), result)?;
        self.passed(&format!("Boxer ({}) created successfully.", boxer.name))?;
        Ok(resp.created_id())
    }

    pub fn delete_boxer(&mut self, id: i64) -> Result<(), SmokeError> {
        self.say(&format!("Deleting boxer by ID ({id})..."))?;
        let result = self.client.delete_boxer(id);
        self.expect_success(&format!("delete boxer by ID ({id})"), result)?;
        self.passed(&format!("Boxer deleted successfully by ID ({id})."))?;
        Ok(())
    }

    pub fn get_boxer_by_id(&mut self, id: i64) -> Result<ApiResponse, SmokeError> {
        self.say(&format!("Getting boxer by ID ({id})..."))?;
        let result = self.client.get_boxer_by_id(id);
        let resp = self.expect_success(&format!("get boxer by ID ({id})"), result)?;
        self.passed(&format!("Boxer retrieved successfully by ID ({id})."))?;
        self.echo(&format!("Boxer JSON (ID {id})"), &resp)?;
        Ok(resp)
    }

    pub fn get_boxer_by_name(&mut self, name: &str) -> Result<ApiResponse, SmokeError> {
        self.say(&format!("Getting boxer by name ({name})..."))?;
        let result = self.client.get_boxer_by_name(name);
        let resp = self.expect_success(&format!("get boxer by name ({name})"), result)?;
        self.passed(&format!("Boxer retrieved successfully by name ({name})."))?;
        self.echo(&format!("Boxer JSON (name {name})"), &resp)?;
        Ok(resp)
    }

    pub fn get_leaderboard(&mut self, sort_by: SortBy) -> Result<ApiResponse, SmokeError> {
        self.say(&format!("Getting leaderboard sorted by {sort_by}..."))?;
        let result = self.client.get_leaderboard(sort_by);
        let resp = self.expect_success(&format!("get leaderboard sorted by {sort_by}"), result)?;
        self.passed("Leaderboard retrieved successfully.")?;
        self.echo(&format!("Leaderboard JSON (sorted by {sort_by})"), &resp)?;
        Ok(resp)
    }

    pub fn enter_ring(&mut self, id: i64) -> Result<(), SmokeError> {
        self.say(&format!("Entering boxer ({id}) into the ring..."))?;
        let result = self.client.enter_ring(id);
        self.expect_success(&format!("enter boxer ({id}) into the ring"), result)?;
        self.passed(&format!("Boxer ({id}) entered the ring successfully."))?;
        Ok(())
    }

    pub fn get_boxers_in_ring(&mut self) -> Result<ApiResponse, SmokeError> {
        self.say("Getting boxers in the ring...")?;
        let result = self.client.get_boxers_in_ring();
        let resp = self.expect_success("get boxers in the ring", result)?;
        self.passed("Boxers in the ring retrieved successfully.")?;
        self.echo("Ring JSON", &resp)?;
        Ok(resp)
    }

    pub fn clear_ring(&mut self) -> Result<(), SmokeError> {
        self.say("Clearing the ring...")?;
        let result = self.client.clear_ring();
        self.expect_success("clear the ring", result)?;
        self.passed("Ring cleared successfully.")?;
        Ok(())
    }

    /// Run a fight and return the winner's name when the server reports one.
    pub fn fight(&mut self) -> Result<Option<String>, SmokeError> {
        self.say("Starting fight...")?;
        let result = self.client.fight();
        let resp = self.expect_success("complete the fight", result)?;
        let winner = resp.winner();
        match winner {
            Some(ref name) => self.passed(&format!("Fight completed. Winner: {name}"))?,
            None => self.passed("Fight completed successfully.")?,
        }
        self.echo("Fight JSON", &resp)?;
        Ok(winner)
    }

    /// Run the full fixed sequence, stopping at the first failed check.
    pub fn run_all(&mut self) -> Result<RunSummary, SmokeError> {
        self.check_health()?;
        self.check_db()?;

        let mut ids = Vec::with_capacity(FIXTURES.len());
        for (i, fixture) in FIXTURES.iter().enumerate() {
            let reported = self.create_boxer(&fixture.to_new_boxer())?;
            // Fresh database: ids follow creation order when the server does not report them
            ids.push(reported.unwrap_or(i as i64 + 1));
        }

        self.delete_boxer(ids[0])?;
        self.get_boxer_by_id(ids[1])?;
        self.get_boxer_by_name(FIXTURES[2].name)?;

        let mut winners = Vec::new();
        self.enter_ring(ids[1])?;
        self.enter_ring(ids[2])?;
        self.get_boxers_in_ring()?;
        winners.push(self.fight()?);
        self.clear_ring()?;

        self.enter_ring(ids[3])?;
        self.enter_ring(ids[4])?;
        winners.push(self.fight()?);

        self.get_leaderboard(SortBy::Wins)?;

        self.say("All tests passed successfully!")?;
        info!(steps = self.steps_passed, "smoketest completed");
        Ok(RunSummary {
            steps_passed: self.steps_passed,
            boxer_ids: ids,
            winners,
        })
    }
}
