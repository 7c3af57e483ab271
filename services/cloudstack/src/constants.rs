// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

// Query parameters used by the control plane.
pub const APIKEY_PARAM: &str = "apiKey";
pub const SIGNATURE_PARAM: &str = "signature";
pub const SESSIONKEY_PARAM: &str = "sessionkey";
pub const COMMAND_PARAM: &str = "command";

// Env values used to load credentials.
pub const CLOUDSTACK_API_KEY: &str = "CLOUDSTACK_API_KEY";
pub const CLOUDSTACK_SECRET_KEY: &str = "CLOUDSTACK_SECRET_KEY";

// The control plane reports authorization failures on login with this
// non-standard status.
pub const STATUS_AUTH_FAILED: u16 = 531;
