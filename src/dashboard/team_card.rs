use hypertext::prelude::*;

use crate::{
    teams::{RosterEntry, TEAM_CAPACITY, Team},
    widgets::badge::Badge,
};

/// The viewer's team: its code, invite link and roster.
pub struct TeamCard<'a> {
    pub team: &'a Team,
    pub roster: &'a [RosterEntry],
    pub viewer_id: &'a str,
    pub invite_link: &'a str,
}

impl<'a> TeamCard<'a> {
    fn is_full(&self) -> bool {
        self.roster.len() as i64 >= TEAM_CAPACITY
    }
}

impl<'a> Renderable for TeamCard<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let team = self.team;

        maud! {
            div class="card mb-4" {
                div class="card-header d-flex align-items-center" {
                    h2 class="h5 mb-0" { (team.name) }
                    @if team.is_led_by(self.viewer_id) {
                        Badge text="Team Leader" variant="primary";
                    }
                }
                div class="card-body" {
                    p class="text-muted mb-3" { (team.institution) }
                    div class="mb-3" {
                        span class="me-2" { "Team code:" }
                        code class="fs-4" { (team.code) }
                    }
                    @if !self.is_full() {
                        div class="mb-3" {
                            label for="invite_link" class="form-label" {
                                "Invite link"
                            }
                            input type="text" class="form-control" id="invite_link"
                                value=(self.invite_link) readonly;
                            div class="form-text" {
                                "Share this link or the code with your teammates."
                            }
                        }
                    }
                    h3 class="h6" {
                        "Members (" (self.roster.len()) "/" (TEAM_CAPACITY) ")"
                    }
                    ul class="list-group" {
                        @for member in self.roster {
                            li class="list-group-item" {
                                (member.display_name())
                                @if member.participant_id == team.leader_id {
                                    Badge text="Leader" variant="secondary";
                                }
                                @if member.participant_id == self.viewer_id {
                                    Badge text="You" variant="info";
                                }
                                @if let Some(discord) = &member.discord_username {
                                    div class="small text-muted" { (discord) }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
